//! Session-lifecycle building blocks composed by the auth command service.

mod credentials;
mod refresh_ledger;
mod verification_ledger;

pub use credentials::CredentialStore;
pub use refresh_ledger::RefreshTokenLedger;
pub use verification_ledger::{VerificationCodeLedger, VerificationPolicy};

pub(crate) use verification_ledger::INVALID_VERIFICATION_CODE;
