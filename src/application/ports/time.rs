// src/application/ports/time.rs
use chrono::{DateTime, Utc};

/// Source of "now" for every expiry decision, so ledgers and the token
/// issuer agree on time and tests can move it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
