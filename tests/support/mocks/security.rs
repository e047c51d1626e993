// tests/support/mocks/security.rs
use async_trait::async_trait;
use ras_core::application::{ApplicationResult, ports::security::PasswordHasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a real hasher and counts how often a new hash is computed.
pub struct CountingHasher<H> {
    inner: H,
    hashes: AtomicUsize,
}

impl<H> CountingHasher<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            hashes: AtomicUsize::new(0),
        }
    }

    pub fn hash_calls(&self) -> usize {
        self.hashes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<H: PasswordHasher> PasswordHasher for CountingHasher<H> {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        self.inner.hash(password).await
    }

    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<bool> {
        self.inner.verify(password, expected_hash).await
    }

    async fn verify_decoy(&self, password: &str) {
        self.inner.verify_decoy(password).await;
    }
}
