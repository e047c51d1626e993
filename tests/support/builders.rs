// tests/support/builders.rs
use super::mocks::{CapturingNotifier, ManualClock};
use chrono::{DateTime, Utc};
use ras_core::application::{
    auth::VerificationPolicy,
    commands::auth::{AuthCommandService, LoginCommand},
    dto::AuthTokenPair,
    ports::{
        ClockPort, NotificationSenderPort, PasswordHasherPort, SecretDigesterPort, TokenIssuerPort,
        security::PasswordHasher,
        time::Clock,
    },
    services::{ApplicationServices, AuthRepositories, SecurityPorts},
};
use ras_core::domain::auth::VerificationCodeRepository;
use ras_core::domain::user::{
    Email, NewUser, PasswordHash, Role, RoleRepository, User, UserRepository, Username,
};
use ras_core::infrastructure::{
    repositories::InMemoryAuthStore,
    security::{
        digest::HmacSecretDigester,
        password::{Argon2Cost, Argon2PasswordHasher},
        token::{JwtSettings, JwtTokenIssuer},
    },
};
use std::sync::Arc;

pub const USER_EMAIL: &str = "keeper@farm.test";
pub const USER_PASSWORD: &str = "correct-horse-42";
pub const ROLE_NAME: &str = "operator";

const SIGNING_KEY: &[u8] = b"integration-signing-key-at-least-32-bytes";
const DIGEST_KEY: &[u8] = b"integration-digest-key-at-least-32-bytes";

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        signing_key: SIGNING_KEY.to_vec(),
        issuer: "ras-core-test".into(),
        audience: "ras-clients-test".into(),
        access_ttl: chrono::Duration::minutes(15),
        refresh_ttl: chrono::Duration::days(7),
    }
}

/// Argon2id at the smallest legal cost; the tests exercise behaviour, not
/// hashing strength.
pub fn cheap_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::new(Argon2Cost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

/// Fully wired auth core over the in-memory store, seeded with one operator
/// account (`USER_EMAIL` / `USER_PASSWORD`).
pub struct TestHarness {
    pub services: Arc<ApplicationServices>,
    pub store: Arc<InMemoryAuthStore>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<CapturingNotifier>,
    pub user: User,
    pub role: Role,
}

impl TestHarness {
    pub async fn new() -> Self {
        HarnessBuilder::new().build().await
    }

    pub fn commands(&self) -> &AuthCommandService {
        &self.services.auth_commands
    }

    pub async fn login(&self) -> AuthTokenPair {
        self.commands()
            .login(LoginCommand {
                email: USER_EMAIL.into(),
                password: USER_PASSWORD.into(),
            })
            .await
            .unwrap()
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn stored_user(&self) -> User {
        self.store.user(self.user.id).unwrap().unwrap()
    }
}

type UsersOverride = Box<dyn FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn UserRepository>>;
type RolesOverride = Box<dyn FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn RoleRepository>>;
type CodesOverride =
    Box<dyn FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn VerificationCodeRepository>>;

pub struct HarnessBuilder {
    policy: VerificationPolicy,
    notifier: Option<Arc<NotificationSenderPort>>,
    password_hasher: Option<Arc<PasswordHasherPort>>,
    users: Option<UsersOverride>,
    roles: Option<RolesOverride>,
    verification_codes: Option<CodesOverride>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            policy: VerificationPolicy::default(),
            notifier: None,
            password_hasher: None,
            users: None,
            roles: None,
            verification_codes: None,
        }
    }

    pub fn policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the capturing notifier used for delivery.
    pub fn notifier(mut self, notifier: Arc<NotificationSenderPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the hasher the services use. The seeded account is still
    /// hashed with [`cheap_hasher`].
    pub fn password_hasher(mut self, hasher: Arc<PasswordHasherPort>) -> Self {
        self.password_hasher = Some(hasher);
        self
    }

    /// Replace the user lookup while keeping the seeded store for the rest.
    pub fn users(self, users: Arc<dyn UserRepository>) -> Self {
        self.users_with(move |_| users)
    }

    pub fn users_with(
        mut self,
        users: impl FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn UserRepository> + 'static,
    ) -> Self {
        self.users = Some(Box::new(users));
        self
    }

    pub fn roles_with(
        mut self,
        roles: impl FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn RoleRepository> + 'static,
    ) -> Self {
        self.roles = Some(Box::new(roles));
        self
    }

    pub fn verification_codes_with(
        mut self,
        codes: impl FnOnce(&Arc<InMemoryAuthStore>) -> Arc<dyn VerificationCodeRepository> + 'static,
    ) -> Self {
        self.verification_codes = Some(Box::new(codes));
        self
    }

    pub async fn build(self) -> TestHarness {
        let hasher = cheap_hasher();
        let store = Arc::new(InMemoryAuthStore::new());
        let role = store.insert_role(ROLE_NAME).unwrap();
        let user = store
            .insert_user(NewUser {
                email: Email::parse(USER_EMAIL).unwrap(),
                username: Username::new("keeper").unwrap(),
                password_hash: PasswordHash::new(hasher.hash(USER_PASSWORD).await.unwrap())
                    .unwrap(),
                role_id: role.id,
                created_at: Utc::now(),
            })
            .unwrap();

        let clock = Arc::new(ManualClock::new());
        let clock_port: Arc<ClockPort> = clock.clone();
        let capturing = Arc::new(CapturingNotifier::default());
        let notifier: Arc<NotificationSenderPort> =
            self.notifier
                .unwrap_or_else(|| Arc::clone(&capturing) as Arc<NotificationSenderPort>);

        let users: Arc<dyn UserRepository> = match self.users {
            Some(build) => build(&store),
            None => Arc::clone(&store) as Arc<dyn UserRepository>,
        };
        let roles: Arc<dyn RoleRepository> = match self.roles {
            Some(build) => build(&store),
            None => Arc::clone(&store) as Arc<dyn RoleRepository>,
        };
        let verification_codes: Arc<dyn VerificationCodeRepository> =
            match self.verification_codes {
                Some(build) => build(&store),
                None => Arc::clone(&store) as Arc<dyn VerificationCodeRepository>,
            };
        let password_hasher: Arc<PasswordHasherPort> = self
            .password_hasher
            .unwrap_or_else(|| Arc::new(hasher) as Arc<PasswordHasherPort>);
        let digester: Arc<SecretDigesterPort> =
            Arc::new(HmacSecretDigester::new(DIGEST_KEY).unwrap());
        let token_issuer: Arc<TokenIssuerPort> =
            Arc::new(JwtTokenIssuer::new(jwt_settings(), Arc::clone(&clock_port)).unwrap());

        let services = Arc::new(ApplicationServices::new(
            AuthRepositories {
                users,
                roles,
                refresh_tokens: store.clone(),
                verification_codes,
            },
            SecurityPorts {
                password_hasher,
                digester,
                token_issuer,
                notifier,
                clock: clock_port,
            },
            self.policy,
        ));

        TestHarness {
            services,
            store,
            clock,
            notifier: capturing,
            user,
            role,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
