use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{PasswordHasherPort, SecretDigesterPort},
};
use crate::domain::auth::TokenDigest;
use std::sync::Arc;

/// Password hashing plus secret digesting behind one handle.
///
/// Passwords go through the slow salted hasher; refresh tokens and
/// verification codes go through the keyed digester and are compared in
/// fixed time.
#[derive(Clone)]
pub struct CredentialStore {
    password_hasher: Arc<PasswordHasherPort>,
    digester: Arc<SecretDigesterPort>,
}

impl CredentialStore {
    pub fn new(password_hasher: Arc<PasswordHasherPort>, digester: Arc<SecretDigesterPort>) -> Self {
        Self {
            password_hasher,
            digester,
        }
    }

    pub async fn hash_password(&self, plaintext: &str) -> ApplicationResult<String> {
        self.password_hasher.hash(plaintext).await
    }

    pub async fn verify_password(&self, plaintext: &str, hash: &str) -> ApplicationResult<bool> {
        self.password_hasher.verify(plaintext, hash).await
    }

    pub async fn verify_decoy(&self, plaintext: &str) {
        self.password_hasher.verify_decoy(plaintext).await;
    }

    pub fn hash_token(&self, secret: &str) -> ApplicationResult<TokenDigest> {
        TokenDigest::new(self.digester.digest(secret)).map_err(|err| {
            ApplicationError::infrastructure(format!("secret digester misbehaved: {err}"))
        })
    }

    pub fn verify_token(&self, secret: &str, digest: &TokenDigest) -> bool {
        self.digester.matches(secret, digest.as_str())
    }
}
