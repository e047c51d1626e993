// src/application/ports/security.rs
use crate::application::{
    ApplicationResult,
    dto::{AccessClaims, AccessToken, RefreshSecret, TokenSubject},
};
use async_trait::async_trait;

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> ApplicationResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<bool>;

    /// Spend the same work as [`PasswordHasher::verify`] without a real
    /// credential, so an unknown account costs as much as a wrong password.
    async fn verify_decoy(&self, _password: &str) {}
}

/// Keyed one-way digest for high-entropy secrets and short one-time codes.
pub trait SecretDigester: Send + Sync {
    fn digest(&self, secret: &str) -> String;

    /// Fixed-time comparison of `secret`'s digest against `expected_digest`.
    fn matches(&self, secret: &str, expected_digest: &str) -> bool;
}

pub trait TokenIssuer: Send + Sync {
    fn generate_access_token(&self, subject: &TokenSubject) -> ApplicationResult<AccessToken>;

    /// Fails only when the expiry cannot be represented.
    fn generate_refresh_token(&self) -> ApplicationResult<RefreshSecret>;

    /// Resource-server side check: signature, expiry, issuer and audience.
    fn verify_access_token(&self, token: &str) -> ApplicationResult<AccessClaims>;
}
