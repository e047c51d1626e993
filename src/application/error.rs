// src/application/error.rs
use crate::domain::errors::DomainError;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Failure kinds surfaced by the auth operations.
///
/// `Unexpected` carries internal detail for logging only; the orchestrator
/// replaces it with [`ApplicationError::unexpected`] before it leaves the
/// application layer.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

pub(crate) const GENERIC_UNEXPECTED: &str = "an unexpected error occurred";

impl ApplicationError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Any failure reported by a repository. What comes back from storage is
    /// never caller input, so even a validation error here is internal.
    pub fn storage(err: DomainError) -> Self {
        Self::Unexpected(err.to_string())
    }

    /// Caller-facing form of an internal failure.
    pub fn unexpected() -> Self {
        Self::Unexpected(GENERIC_UNEXPECTED.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::Conflict(msg) | DomainError::Persistence(msg) => Self::Unexpected(msg),
        }
    }
}
