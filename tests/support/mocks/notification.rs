// tests/support/mocks/notification.rs
use async_trait::async_trait;
use ras_core::application::{
    ApplicationResult, error::ApplicationError, ports::notification::NotificationSender,
};
use ras_core::domain::{auth::VerificationKind, user::Email};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct SentCode {
    pub recipient: String,
    pub kind: VerificationKind,
    pub code: String,
}

/// Records every delivery so tests can read back the plaintext code.
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<SentCode>>,
}

impl CapturingNotifier {
    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|sent| sent.recipient == recipient)
            .map(|sent| sent.code.clone())
    }
}

#[async_trait]
impl NotificationSender for CapturingNotifier {
    async fn send_verification_code(
        &self,
        recipient: &Email,
        kind: VerificationKind,
        code: &str,
    ) -> ApplicationResult<()> {
        self.sent.lock().unwrap().push(SentCode {
            recipient: recipient.as_str().to_string(),
            kind,
            code: code.to_string(),
        });
        Ok(())
    }
}

/// Gateway that is always down.
pub struct FailingNotifier;

#[async_trait]
impl NotificationSender for FailingNotifier {
    async fn send_verification_code(
        &self,
        _recipient: &Email,
        _kind: VerificationKind,
        _code: &str,
    ) -> ApplicationResult<()> {
        Err(ApplicationError::infrastructure("smtp relay unreachable"))
    }
}
