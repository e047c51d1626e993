use crate::domain::errors::DomainResult;
use crate::domain::user::{
    entity::{Role, User},
    value_objects::{Email, RoleId, UserId},
};
use async_trait::async_trait;

/// Read access to the account collaborator. Account creation and profile
/// updates live outside the auth core.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: RoleId) -> DomainResult<Option<Role>>;
}
