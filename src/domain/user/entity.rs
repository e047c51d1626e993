// src/domain/user/entity.rs
use crate::domain::user::value_objects::{Email, PasswordHash, RoleId, RoleName, UserId, Username};
use chrono::{DateTime, Utc};

/// Account row as seen by the auth core. Owned by the account collaborator;
/// this crate only mutates `password_hash`, through a verification-code redemption.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub password_hash: PasswordHash,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    pub password_hash: PasswordHash,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}
