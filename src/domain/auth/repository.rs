use crate::domain::auth::{
    refresh_token::{NewRefreshToken, RefreshTokenRecord},
    value_objects::{RefreshTokenId, TokenDigest, VerificationCodeId, VerificationKind},
    verification_code::{CodeRedemption, NewVerificationCode, VerificationCodeRecord},
};
use crate::domain::errors::DomainResult;
use crate::domain::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, token: NewRefreshToken) -> DomainResult<RefreshTokenRecord>;

    async fn find_by_digest(&self, digest: &TokenDigest)
    -> DomainResult<Option<RefreshTokenRecord>>;

    /// Revoke `id` and insert `replacement` in one transaction.
    ///
    /// The revoke is conditional on the row still being active at `now`; when
    /// no row matches (a concurrent rotation or logout got there first) nothing
    /// is written and `Ok(None)` is returned.
    async fn rotate(
        &self,
        id: RefreshTokenId,
        replacement: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<RefreshTokenRecord>>;

    /// Mark `id` revoked if it is not already. Returns whether a row changed.
    async fn revoke(&self, id: RefreshTokenId, now: DateTime<Utc>) -> DomainResult<bool>;

    async fn revoke_all_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<u64>;
}

#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Consume every open code of the same (user, kind) and insert `code`, in
    /// one transaction.
    async fn replace_open(&self, code: NewVerificationCode) -> DomainResult<VerificationCodeRecord>;

    async fn find_usable(
        &self,
        user_id: UserId,
        kind: VerificationKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<VerificationCodeRecord>>;

    /// Count a wrong guess against `id`; the code is consumed once
    /// `max_attempts` is reached.
    async fn register_failed_attempt(
        &self,
        id: VerificationCodeId,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Consume `id` (only if still usable at `now`) and apply `redemption` in
    /// the same transaction. Returns `false` without writing anything when the
    /// code is no longer usable.
    async fn redeem(
        &self,
        id: VerificationCodeId,
        user_id: UserId,
        redemption: CodeRedemption,
        now: DateTime<Utc>,
    ) -> DomainResult<bool>;
}
