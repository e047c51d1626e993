use crate::application::{
    auth::CredentialStore,
    error::{ApplicationError, ApplicationResult},
    ports::ClockPort,
};
use crate::domain::{
    auth::{
        CodeRedemption, NewVerificationCode, VerificationCodeRecord, VerificationCodeRepository,
        VerificationKind,
    },
    user::UserId,
};
use chrono::Duration;
use rand::{Rng, rngs::OsRng};
use std::sync::Arc;

pub(crate) const INVALID_VERIFICATION_CODE: &str = "invalid or expired verification code";

const CODE_SPACE: u32 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct VerificationPolicy {
    pub code_ttl: Duration,
    pub max_attempts: u32,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(5),
            max_attempts: 5,
        }
    }
}

/// Issues and redeems one-time numeric codes.
pub struct VerificationCodeLedger {
    repo: Arc<dyn VerificationCodeRepository>,
    credentials: CredentialStore,
    clock: Arc<ClockPort>,
    policy: VerificationPolicy,
}

impl VerificationCodeLedger {
    pub fn new(
        repo: Arc<dyn VerificationCodeRepository>,
        credentials: CredentialStore,
        clock: Arc<ClockPort>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            repo,
            credentials,
            clock,
            policy,
        }
    }

    /// Invalidate every open code of `kind` for the user, store a fresh one
    /// and return its plaintext for out-of-band delivery.
    pub async fn issue(&self, user_id: UserId, kind: VerificationKind) -> ApplicationResult<String> {
        let code = generate_code();
        let now = self.clock.now();
        let record = self
            .repo
            .replace_open(NewVerificationCode {
                user_id,
                kind,
                code_digest: self.credentials.hash_token(&code)?,
                expires_at: now.checked_add_signed(self.policy.code_ttl).ok_or_else(|| {
                    ApplicationError::infrastructure("verification code expiration overflow")
                })?,
                created_at: now,
            })
            .await
            .map_err(ApplicationError::storage)?;
        tracing::debug!(user_id = %user_id, code_id = %record.id, kind = %kind, "verification code issued");

        Ok(code)
    }

    /// Check `presented` against the single usable code of `kind`. A mismatch
    /// counts towards the attempt limit. Nothing is consumed here.
    pub async fn verify(
        &self,
        user_id: UserId,
        kind: VerificationKind,
        presented: &str,
    ) -> ApplicationResult<VerificationCodeRecord> {
        let now = self.clock.now();

        let mut usable = self
            .repo
            .find_usable(user_id, kind, now)
            .await
            .map_err(ApplicationError::storage)?;
        if usable.len() != 1 {
            if usable.len() > 1 {
                tracing::error!(
                    user_id = %user_id,
                    kind = %kind,
                    open = usable.len(),
                    "integrity error: more than one usable verification code"
                );
            }
            return Err(ApplicationError::unauthorized(INVALID_VERIFICATION_CODE));
        }
        let record = usable.remove(0);

        if !self.credentials.verify_token(presented.trim(), &record.code_digest) {
            self.repo
                .register_failed_attempt(record.id, self.policy.max_attempts, now)
                .await
                .map_err(ApplicationError::storage)?;
            tracing::info!(user_id = %user_id, code_id = %record.id, "verification code mismatch");
            return Err(ApplicationError::unauthorized(INVALID_VERIFICATION_CODE));
        }

        Ok(record)
    }

    /// Consume a verified code and apply `redemption` as one unit. Fails
    /// `Unauthorized` when the code stopped being usable after [`Self::verify`].
    pub async fn redeem(
        &self,
        record: &VerificationCodeRecord,
        redemption: CodeRedemption,
    ) -> ApplicationResult<()> {
        if redemption.kind() != record.kind {
            return Err(ApplicationError::infrastructure(format!(
                "redemption of kind {} presented for a {} code",
                redemption.kind(),
                record.kind
            )));
        }

        let redeemed = self
            .repo
            .redeem(record.id, record.user_id, redemption, self.clock.now())
            .await
            .map_err(ApplicationError::storage)?;
        if !redeemed {
            tracing::info!(
                user_id = %record.user_id,
                code_id = %record.id,
                "verification code was no longer usable at redemption"
            );
            return Err(ApplicationError::unauthorized(INVALID_VERIFICATION_CODE));
        }

        Ok(())
    }
}

fn generate_code() -> String {
    let value = OsRng.gen_range(0..CODE_SPACE);
    format!("{value:06}")
}
