use crate::application::{
    auth::CredentialStore,
    dto::{IssuedRefreshToken, RefreshSecret},
    error::{ApplicationError, ApplicationResult},
    ports::{ClockPort, TokenIssuerPort},
};
use crate::domain::{
    auth::{NewRefreshToken, RefreshTokenRecord, RefreshTokenRepository, RefreshTokenState},
    user::UserId,
};
use std::sync::Arc;

const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

/// Owns the refresh-token state machine: `Active -> Revoked` through
/// rotation or logout, `Active -> Expired` through time.
pub struct RefreshTokenLedger {
    repo: Arc<dyn RefreshTokenRepository>,
    issuer: Arc<TokenIssuerPort>,
    credentials: CredentialStore,
    clock: Arc<ClockPort>,
}

impl RefreshTokenLedger {
    pub fn new(
        repo: Arc<dyn RefreshTokenRepository>,
        issuer: Arc<TokenIssuerPort>,
        credentials: CredentialStore,
        clock: Arc<ClockPort>,
    ) -> Self {
        Self {
            repo,
            issuer,
            credentials,
            clock,
        }
    }

    pub async fn issue(&self, user_id: UserId) -> ApplicationResult<IssuedRefreshToken> {
        let (replacement, secret) = self.new_token_for(user_id)?;
        let record = self
            .repo
            .insert(replacement)
            .await
            .map_err(ApplicationError::storage)?;
        tracing::debug!(user_id = %user_id, token_id = %record.id, "refresh token issued");

        Ok(IssuedRefreshToken { record, secret })
    }

    /// Resolve a presented plaintext to its active record.
    pub async fn find_active(&self, presented: &str) -> ApplicationResult<RefreshTokenRecord> {
        let record = self
            .lookup(presented)
            .await?
            .ok_or_else(|| ApplicationError::unauthorized(INVALID_REFRESH_TOKEN))?;

        let state = record.state(self.clock.now());
        if state != RefreshTokenState::Active {
            tracing::info!(
                user_id = %record.user_id,
                token_id = %record.id,
                state = ?state,
                "refresh token presented in terminal state"
            );
            return Err(ApplicationError::unauthorized(INVALID_REFRESH_TOKEN));
        }

        Ok(record)
    }

    /// Revoke `current` and persist its successor atomically. Of several
    /// concurrent rotations of the same record at most one succeeds; the
    /// rest fail `Unauthorized`.
    pub async fn rotate(&self, current: &RefreshTokenRecord) -> ApplicationResult<IssuedRefreshToken> {
        let now = self.clock.now();
        let (replacement, secret) = self.new_token_for(current.user_id)?;

        let rotated = self
            .repo
            .rotate(current.id, replacement, now)
            .await
            .map_err(ApplicationError::storage)?;

        match rotated {
            Some(record) => {
                tracing::debug!(
                    user_id = %current.user_id,
                    revoked_token_id = %current.id,
                    token_id = %record.id,
                    "refresh token rotated"
                );
                Ok(IssuedRefreshToken { record, secret })
            }
            None => {
                tracing::warn!(
                    user_id = %current.user_id,
                    token_id = %current.id,
                    "refresh token was no longer active at rotation"
                );
                Err(ApplicationError::unauthorized(INVALID_REFRESH_TOKEN))
            }
        }
    }

    /// Idempotent; unknown or already-revoked tokens are not an error.
    pub async fn revoke(&self, presented: &str) -> ApplicationResult<bool> {
        let Some(record) = self.lookup(presented).await? else {
            return Ok(false);
        };
        if record.revoked {
            return Ok(false);
        }

        let changed = self
            .repo
            .revoke(record.id, self.clock.now())
            .await
            .map_err(ApplicationError::storage)?;
        if changed {
            tracing::debug!(user_id = %record.user_id, token_id = %record.id, "refresh token revoked");
        }
        Ok(changed)
    }

    pub async fn revoke_all(&self, user_id: UserId) -> ApplicationResult<u64> {
        let count = self
            .repo
            .revoke_all_for_user(user_id, self.clock.now())
            .await
            .map_err(ApplicationError::storage)?;
        tracing::info!(user_id = %user_id, revoked = count, "revoked all refresh tokens for user");
        Ok(count)
    }

    async fn lookup(&self, presented: &str) -> ApplicationResult<Option<RefreshTokenRecord>> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Ok(None);
        }

        let digest = self.credentials.hash_token(presented)?;
        let record = self
            .repo
            .find_by_digest(&digest)
            .await
            .map_err(ApplicationError::storage)?;

        Ok(record.filter(|record| self.credentials.verify_token(presented, &record.token_digest)))
    }

    fn new_token_for(
        &self,
        user_id: UserId,
    ) -> ApplicationResult<(NewRefreshToken, RefreshSecret)> {
        let secret = self.issuer.generate_refresh_token()?;
        let token_digest = self.credentials.hash_token(secret.expose())?;
        let replacement = NewRefreshToken {
            user_id,
            token_digest,
            expires_at: secret.expires_at,
            created_at: self.clock.now(),
        };
        Ok((replacement, secret))
    }
}
