// src/application/ports/notification.rs
use crate::application::ApplicationResult;
use crate::domain::{auth::VerificationKind, user::Email};
use async_trait::async_trait;

/// Out-of-band delivery of one-time codes (email/SMS gateway).
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        kind: VerificationKind,
        code: &str,
    ) -> ApplicationResult<()>;
}
