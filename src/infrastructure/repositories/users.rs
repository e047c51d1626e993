// src/infrastructure/repositories/users.rs
use super::{corrupt_row, map_sqlx};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::user::{
    Email, PasswordHash, Role, RoleId, RoleName, RoleRepository, User, UserId, UserRepository,
    Username,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

// `Email` is already folded; rows written elsewhere may not be.
const SELECT_BY_EMAIL: &str = "SELECT id, email, username, password_hash, role_id, created_at
     FROM users WHERE lower(email) = $1";
const SELECT_BY_ID: &str = "SELECT id, email, username, password_hash, role_id, created_at
     FROM users WHERE id = $1";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    role_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = corrupt_row("users");
        Ok(User {
            id: UserId::new(row.id).map_err(&corrupt)?,
            email: Email::parse(row.email).map_err(&corrupt)?,
            username: Username::new(row.username).map_err(&corrupt)?,
            password_hash: PasswordHash::new(row.password_hash).map_err(&corrupt)?,
            role_id: RoleId::new(row.role_id).map_err(&corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_BY_EMAIL)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_BY_ID)
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(User::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = DomainError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let corrupt = corrupt_row("roles");
        Ok(Role {
            id: RoleId::new(row.id).map_err(&corrupt)?,
            name: RoleName::new(row.name).map_err(&corrupt)?,
        })
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> DomainResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE id = $1")
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(Role::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_row() -> UserRow {
        UserRow {
            id: 3,
            email: "Keeper@Farm.TEST".into(),
            username: "keeper".into(),
            password_hash: "$argon2id$stored".into(),
            role_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_role_name_in_storage_is_a_persistence_failure() {
        let err = Role::try_from(RoleRow {
            id: 1,
            name: "   ".into(),
        })
        .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(ref msg) if msg.contains("corrupt roles row")));
    }

    #[test]
    fn invalid_user_columns_are_persistence_failures() {
        let blank_username = User::try_from(UserRow {
            username: String::new(),
            ..user_row()
        });
        let bad_id = User::try_from(UserRow { id: 0, ..user_row() });

        for result in [blank_username, bad_id] {
            assert!(matches!(result, Err(DomainError::Persistence(_))));
        }
    }

    #[test]
    fn mixed_case_stored_email_is_folded_on_read() {
        let user = User::try_from(user_row()).unwrap();
        assert_eq!(user.email.as_str(), "keeper@farm.test");
    }

    #[test]
    fn email_lookup_compares_folded_addresses() {
        assert!(SELECT_BY_EMAIL.contains("lower(email) = $1"));
    }
}
