use crate::application::{
    error::{ApplicationError, ApplicationResult},
    ports::security::PasswordHasher,
};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;
use std::sync::Arc;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Cost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
    decoy_hash: Arc<str>,
}

impl Argon2PasswordHasher {
    pub fn new(cost: Argon2Cost) -> ApplicationResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| ApplicationError::infrastructure(format!("invalid argon2 cost: {err}")))?;
        let decoy_hash = hash_with(&params, DECOY_PASSWORD)?;

        Ok(Self {
            params,
            decoy_hash: Arc::from(decoy_hash),
        })
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> ApplicationResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApplicationError::infrastructure(err.to_string()))
}

// Cost parameters are read back from the PHC string, so hashes made under an
// older cost setting keep verifying.
fn verify_with(params: &Params, password: &str, expected_hash: &str) -> ApplicationResult<bool> {
    let parsed = PasswordHash::new(expected_hash)
        .map_err(|err| ApplicationError::infrastructure(format!("stored password hash unusable: {err}")))?;
    Ok(argon2(params)
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        let password = password.to_owned();
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?
    }

    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<bool> {
        let password = password.to_owned();
        let expected_hash = expected_hash.to_owned();
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || verify_with(&params, &password, &expected_hash))
            .await
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?
    }

    async fn verify_decoy(&self, password: &str) {
        let password = password.to_owned();
        let params = self.params.clone();
        let decoy_hash = Arc::clone(&self.decoy_hash);
        let outcome =
            tokio::task::spawn_blocking(move || verify_with(&params, &password, &decoy_hash)).await;
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "decoy password verification did not complete");
        }
    }
}
