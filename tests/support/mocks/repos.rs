// tests/support/mocks/repos.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ras_core::domain::auth::{
    CodeRedemption, NewVerificationCode, VerificationCodeId, VerificationCodeRecord,
    VerificationCodeRepository, VerificationKind,
};
use ras_core::domain::errors::{DomainError, DomainResult};
use ras_core::domain::user::{Email, Role, RoleId, RoleRepository, User, UserId, UserRepository};
use ras_core::infrastructure::repositories::InMemoryAuthStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// User store whose backing database is unreachable.
pub struct UnavailableUserRepo;

#[async_trait]
impl UserRepository for UnavailableUserRepo {
    async fn find_by_email(&self, _email: &Email) -> DomainResult<Option<User>> {
        Err(DomainError::persistence("connection refused"))
    }

    async fn find_by_id(&self, _id: UserId) -> DomainResult<Option<User>> {
        Err(DomainError::persistence("connection refused"))
    }
}

/// Email lookups hit the store; id lookups find nothing, as if the account
/// row disappeared after its refresh tokens were issued.
pub struct OrphanedUserLookup(pub Arc<InMemoryAuthStore>);

#[async_trait]
impl UserRepository for OrphanedUserLookup {
    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>> {
        <InMemoryAuthStore as UserRepository>::find_by_email(&self.0, email).await
    }

    async fn find_by_id(&self, _id: UserId) -> DomainResult<Option<User>> {
        Ok(None)
    }
}

/// Role table backed by the store until `withdrawn` is set.
pub struct WithdrawableRoles {
    pub store: Arc<InMemoryAuthStore>,
    pub withdrawn: Arc<AtomicBool>,
}

#[async_trait]
impl RoleRepository for WithdrawableRoles {
    async fn find_by_id(&self, id: RoleId) -> DomainResult<Option<Role>> {
        if self.withdrawn.load(Ordering::SeqCst) {
            return Ok(None);
        }
        <InMemoryAuthStore as RoleRepository>::find_by_id(&self.store, id).await
    }
}

/// Role table holding a row that fails its value-object check on read.
pub struct CorruptRoleRepo;

#[async_trait]
impl RoleRepository for CorruptRoleRepo {
    async fn find_by_id(&self, _id: RoleId) -> DomainResult<Option<Role>> {
        Err(DomainError::Validation("role name cannot be empty".into()))
    }
}

/// Verification store whose redemption transaction fails and rolls back:
/// every other operation reaches the store.
pub struct FailingRedemptionCodes(pub Arc<InMemoryAuthStore>);

#[async_trait]
impl VerificationCodeRepository for FailingRedemptionCodes {
    async fn replace_open(&self, code: NewVerificationCode) -> DomainResult<VerificationCodeRecord> {
        self.0.replace_open(code).await
    }

    async fn find_usable(
        &self,
        user_id: UserId,
        kind: VerificationKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<VerificationCodeRecord>> {
        self.0.find_usable(user_id, kind, now).await
    }

    async fn register_failed_attempt(
        &self,
        id: VerificationCodeId,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.0.register_failed_attempt(id, max_attempts, now).await
    }

    async fn redeem(
        &self,
        _id: VerificationCodeId,
        _user_id: UserId,
        _redemption: CodeRedemption,
        _now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        Err(DomainError::persistence("password update failed; transaction rolled back"))
    }
}
