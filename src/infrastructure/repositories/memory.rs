// src/infrastructure/repositories/memory.rs
//! Process-local store backing all four auth repositories. One mutex guards
//! every table, so multi-row operations (rotate, replace_open, redeem) are as
//! atomic here as their transactional Postgres counterparts.
use crate::domain::auth::{
    CodeRedemption, NewRefreshToken, NewVerificationCode, RefreshTokenId, RefreshTokenRecord,
    RefreshTokenRepository, TokenDigest, VerificationCodeId, VerificationCodeRecord,
    VerificationCodeRepository, VerificationKind,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::user::{
    Email, NewUser, Role, RoleId, RoleName, RoleRepository, User, UserId, UserRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    roles: BTreeMap<i64, Role>,
    users: BTreeMap<i64, User>,
    refresh_tokens: BTreeMap<i64, RefreshTokenRecord>,
    verification_codes: BTreeMap<i64, VerificationCodeRecord>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_refresh_token(&mut self, token: NewRefreshToken) -> DomainResult<RefreshTokenRecord> {
        if self
            .refresh_tokens
            .values()
            .any(|existing| existing.token_digest == token.token_digest)
        {
            return Err(DomainError::Conflict(
                "refresh token digest collision".into(),
            ));
        }

        let id = self.next_id();
        let record = RefreshTokenRecord {
            id: RefreshTokenId::new(id)?,
            user_id: token.user_id,
            token_digest: token.token_digest,
            expires_at: token.expires_at,
            revoked: false,
            created_at: token.created_at,
        };
        self.refresh_tokens.insert(id, record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct InMemoryAuthStore {
    state: Mutex<State>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DomainError::persistence("in-memory auth store poisoned"))
    }

    pub fn insert_role(&self, name: &str) -> DomainResult<Role> {
        let mut state = self.lock()?;
        let id = state.next_id();
        let role = Role {
            id: RoleId::new(id)?,
            name: RoleName::new(name)?,
        };
        state.roles.insert(id, role.clone());
        Ok(role)
    }

    pub fn insert_user(&self, new_user: NewUser) -> DomainResult<User> {
        let mut state = self.lock()?;
        if state.users.values().any(|user| user.email == new_user.email) {
            return Err(DomainError::Conflict("email already registered".into()));
        }
        if !state.roles.contains_key(&i64::from(new_user.role_id)) {
            return Err(DomainError::NotFound("role not found".into()));
        }

        let id = state.next_id();
        let user = User {
            id: UserId::new(id)?,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            role_id: new_user.role_id,
            created_at: new_user.created_at,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.lock()?.users.get(&i64::from(id)).cloned())
    }

    pub fn refresh_tokens(&self) -> DomainResult<Vec<RefreshTokenRecord>> {
        Ok(self.lock()?.refresh_tokens.values().cloned().collect())
    }

    pub fn verification_codes(&self) -> DomainResult<Vec<VerificationCodeRecord>> {
        Ok(self.lock()?.verification_codes.values().cloned().collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryAuthStore {
    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        self.user(id)
    }
}

#[async_trait]
impl RoleRepository for InMemoryAuthStore {
    async fn find_by_id(&self, id: RoleId) -> DomainResult<Option<Role>> {
        Ok(self.lock()?.roles.get(&i64::from(id)).cloned())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryAuthStore {
    async fn insert(&self, token: NewRefreshToken) -> DomainResult<RefreshTokenRecord> {
        self.lock()?.insert_refresh_token(token)
    }

    async fn find_by_digest(
        &self,
        digest: &TokenDigest,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        Ok(self
            .lock()?
            .refresh_tokens
            .values()
            .find(|record| &record.token_digest == digest)
            .cloned())
    }

    async fn rotate(
        &self,
        id: RefreshTokenId,
        replacement: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let mut state = self.lock()?;

        match state.refresh_tokens.get(&i64::from(id)) {
            Some(current) if current.is_active(now) => {}
            _ => return Ok(None),
        }

        // Insert first so a digest collision leaves the old token untouched.
        let record = state.insert_refresh_token(replacement)?;
        if let Some(current) = state.refresh_tokens.get_mut(&i64::from(id)) {
            current.revoked = true;
        }
        Ok(Some(record))
    }

    async fn revoke(&self, id: RefreshTokenId, _now: DateTime<Utc>) -> DomainResult<bool> {
        let mut state = self.lock()?;
        match state.refresh_tokens.get_mut(&i64::from(id)) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId, _now: DateTime<Utc>) -> DomainResult<u64> {
        let mut state = self.lock()?;
        let mut revoked = 0;
        for record in state
            .refresh_tokens
            .values_mut()
            .filter(|record| record.user_id == user_id && !record.revoked)
        {
            record.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryAuthStore {
    async fn replace_open(&self, code: NewVerificationCode) -> DomainResult<VerificationCodeRecord> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&i64::from(code.user_id)) {
            return Err(DomainError::NotFound("user not found".into()));
        }

        for open in state
            .verification_codes
            .values_mut()
            .filter(|open| open.user_id == code.user_id && open.kind == code.kind && !open.consumed)
        {
            open.consumed = true;
        }

        let id = state.next_id();
        let record = VerificationCodeRecord {
            id: VerificationCodeId::new(id)?,
            user_id: code.user_id,
            kind: code.kind,
            code_digest: code.code_digest,
            expires_at: code.expires_at,
            consumed: false,
            failed_attempts: 0,
            created_at: code.created_at,
        };
        state.verification_codes.insert(id, record.clone());
        Ok(record)
    }

    async fn find_usable(
        &self,
        user_id: UserId,
        kind: VerificationKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<VerificationCodeRecord>> {
        let mut usable: Vec<_> = self
            .lock()?
            .verification_codes
            .values()
            .filter(|record| record.user_id == user_id && record.kind == kind && record.is_usable(now))
            .cloned()
            .collect();
        usable.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(usable)
    }

    async fn register_failed_attempt(
        &self,
        id: VerificationCodeId,
        max_attempts: u32,
        _now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut state = self.lock()?;
        if let Some(record) = state
            .verification_codes
            .get_mut(&i64::from(id))
            .filter(|record| !record.consumed)
        {
            record.failed_attempts = record.failed_attempts.saturating_add(1);
            if record.failed_attempts >= max_attempts {
                record.consumed = true;
            }
        }
        Ok(())
    }

    async fn redeem(
        &self,
        id: VerificationCodeId,
        user_id: UserId,
        redemption: CodeRedemption,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let mut state = self.lock()?;

        let redeemable = state.verification_codes.get(&i64::from(id)).is_some_and(|record| {
            record.user_id == user_id && record.kind == redemption.kind() && record.is_usable(now)
        });
        if !redeemable || !state.users.contains_key(&i64::from(user_id)) {
            return Ok(false);
        }

        match redemption {
            CodeRedemption::PasswordReset { new_password_hash } => {
                if let Some(user) = state.users.get_mut(&i64::from(user_id)) {
                    user.password_hash = new_password_hash;
                }
            }
        }
        if let Some(record) = state.verification_codes.get_mut(&i64::from(id)) {
            record.consumed = true;
        }
        Ok(true)
    }
}
