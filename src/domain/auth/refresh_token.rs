// src/domain/auth/refresh_token.rs
use crate::domain::auth::value_objects::{RefreshTokenId, TokenDigest};
use crate::domain::user::UserId;
use chrono::{DateTime, Utc};

/// Lifecycle state of a refresh token. `Revoked` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

/// Persisted refresh token. Rows are never deleted; `revoked` only ever moves
/// from `false` to `true`.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_digest: TokenDigest,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn state(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked {
            RefreshTokenState::Revoked
        } else if self.expires_at <= now {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == RefreshTokenState::Active
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: UserId,
    pub token_digest: TokenDigest,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(revoked: bool, expires_in: Duration) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            id: RefreshTokenId::new(1).unwrap(),
            user_id: UserId::new(1).unwrap(),
            token_digest: TokenDigest::new("digest").unwrap(),
            expires_at: now + expires_in,
            revoked,
            created_at: now,
        }
    }

    #[test]
    fn revoked_wins_over_expiry() {
        let now = Utc::now();
        assert_eq!(
            record(true, Duration::days(-1)).state(now),
            RefreshTokenState::Revoked
        );
        assert_eq!(
            record(true, Duration::days(1)).state(now),
            RefreshTokenState::Revoked
        );
    }

    #[test]
    fn expiry_is_inclusive_of_the_boundary() {
        let token = record(false, Duration::days(7));
        assert!(token.is_active(token.expires_at - Duration::seconds(1)));
        assert_eq!(token.state(token.expires_at), RefreshTokenState::Expired);
    }
}
