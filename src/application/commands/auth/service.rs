use std::sync::Arc;

use crate::application::{
    auth::{CredentialStore, RefreshTokenLedger, VerificationCodeLedger},
    dto::{AccessToken, TokenSubject},
    error::{ApplicationError, ApplicationResult},
    ports::{NotificationSenderPort, TokenIssuerPort},
};
use crate::domain::user::{Role, RoleRepository, User, UserRepository};

/// Entry point for the auth boundary. Every public operation returns either a
/// uniform message or one of `Unauthorized`, `BadRequest`, `Unexpected`.
pub struct AuthCommandService {
    pub(super) user_repo: Arc<dyn UserRepository>,
    pub(super) role_repo: Arc<dyn RoleRepository>,
    pub(super) credentials: CredentialStore,
    pub(super) token_issuer: Arc<TokenIssuerPort>,
    pub(super) refresh_tokens: Arc<RefreshTokenLedger>,
    pub(super) verification_codes: Arc<VerificationCodeLedger>,
    pub(super) notifier: Arc<NotificationSenderPort>,
}

impl AuthCommandService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        role_repo: Arc<dyn RoleRepository>,
        credentials: CredentialStore,
        token_issuer: Arc<TokenIssuerPort>,
        refresh_tokens: Arc<RefreshTokenLedger>,
        verification_codes: Arc<VerificationCodeLedger>,
        notifier: Arc<NotificationSenderPort>,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            credentials,
            token_issuer,
            refresh_tokens,
            verification_codes,
            notifier,
        }
    }

    pub(super) async fn resolve_role(&self, user: &User) -> ApplicationResult<Role> {
        self.role_repo
            .find_by_id(user.role_id)
            .await
            .map_err(ApplicationError::storage)?
            .ok_or_else(|| {
                ApplicationError::infrastructure(format!(
                    "integrity error: role {} of user {} does not exist",
                    user.role_id, user.id
                ))
            })
    }

    pub(super) fn mint_access_token(&self, user: &User, role: &Role) -> ApplicationResult<AccessToken> {
        self.token_issuer
            .generate_access_token(&TokenSubject::new(user, role))
    }
}

/// Log the internal detail of an `Unexpected` failure and hand back the
/// generic form. Other kinds pass through untouched.
pub(super) fn surface(operation: &'static str, err: ApplicationError) -> ApplicationError {
    match err {
        ApplicationError::Unexpected(detail) => {
            tracing::error!(operation, error = %detail, "auth operation failed");
            ApplicationError::unexpected()
        }
        ApplicationError::NotFound(detail) => {
            tracing::error!(operation, error = %detail, "auth operation hit a missing record");
            ApplicationError::unexpected()
        }
        other => other,
    }
}
