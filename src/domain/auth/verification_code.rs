// src/domain/auth/verification_code.rs
use crate::domain::auth::value_objects::{TokenDigest, VerificationCodeId, VerificationKind};
use crate::domain::user::{PasswordHash, UserId};
use chrono::{DateTime, Utc};

/// Persisted one-time code. At most one usable code exists per (user, kind):
/// issuing a new one consumes every open predecessor first.
#[derive(Debug, Clone)]
pub struct VerificationCodeRecord {
    pub id: VerificationCodeId,
    pub user_id: UserId,
    pub kind: VerificationKind,
    pub code_digest: TokenDigest,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub failed_attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl VerificationCodeRecord {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewVerificationCode {
    pub user_id: UserId,
    pub kind: VerificationKind,
    pub code_digest: TokenDigest,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Side effect committed together with consuming a code.
#[derive(Debug, Clone)]
pub enum CodeRedemption {
    PasswordReset { new_password_hash: PasswordHash },
}

impl CodeRedemption {
    pub fn kind(&self) -> VerificationKind {
        match self {
            CodeRedemption::PasswordReset { .. } => VerificationKind::PasswordReset,
        }
    }
}
