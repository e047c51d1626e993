// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        auth::{CredentialStore, RefreshTokenLedger, VerificationCodeLedger, VerificationPolicy},
        commands::auth::AuthCommandService,
        dto::AccessClaims,
        ports::{
            ClockPort, NotificationSenderPort, PasswordHasherPort, SecretDigesterPort,
            TokenIssuerPort,
        },
        ApplicationResult,
    },
    domain::{
        auth::{RefreshTokenRepository, VerificationCodeRepository},
        user::{RoleRepository, UserRepository},
    },
};

/// Storage adapters the auth core needs, one per aggregate.
pub struct AuthRepositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub verification_codes: Arc<dyn VerificationCodeRepository>,
}

pub struct SecurityPorts {
    pub password_hasher: Arc<PasswordHasherPort>,
    pub digester: Arc<SecretDigesterPort>,
    pub token_issuer: Arc<TokenIssuerPort>,
    pub notifier: Arc<NotificationSenderPort>,
    pub clock: Arc<ClockPort>,
}

pub struct ApplicationServices {
    pub auth_commands: Arc<AuthCommandService>,
    token_issuer: Arc<TokenIssuerPort>,
}

impl ApplicationServices {
    pub fn new(
        repositories: AuthRepositories,
        ports: SecurityPorts,
        verification_policy: VerificationPolicy,
    ) -> Self {
        let credentials = CredentialStore::new(
            Arc::clone(&ports.password_hasher),
            Arc::clone(&ports.digester),
        );

        let refresh_tokens = Arc::new(RefreshTokenLedger::new(
            Arc::clone(&repositories.refresh_tokens),
            Arc::clone(&ports.token_issuer),
            credentials.clone(),
            Arc::clone(&ports.clock),
        ));

        let verification_codes = Arc::new(VerificationCodeLedger::new(
            Arc::clone(&repositories.verification_codes),
            credentials.clone(),
            Arc::clone(&ports.clock),
            verification_policy,
        ));

        let auth_commands = Arc::new(AuthCommandService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.roles),
            credentials,
            Arc::clone(&ports.token_issuer),
            refresh_tokens,
            verification_codes,
            Arc::clone(&ports.notifier),
        ));

        Self {
            auth_commands,
            token_issuer: ports.token_issuer,
        }
    }

    /// Verify a raw bearer token on behalf of the presentation layer.
    pub fn authenticate(&self, token: &str) -> ApplicationResult<AccessClaims> {
        self.token_issuer.verify_access_token(token)
    }
}
