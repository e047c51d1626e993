// src/infrastructure/security/token.rs
use crate::application::{
    dto::{AccessClaims, AccessToken, RefreshSecret, TokenSubject},
    error::{ApplicationError, ApplicationResult},
    ports::{ClockPort, security::TokenIssuer},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Duration;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::{RngCore, rngs::OsRng};
use std::sync::Arc;
use uuid::Uuid;

pub const MIN_SIGNING_KEY_BYTES: usize = 32;
const REFRESH_SECRET_BYTES: usize = 64;

#[derive(Clone)]
pub struct JwtSettings {
    pub signing_key: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// HS256 access tokens plus opaque random refresh secrets.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<ClockPort>,
}

impl JwtTokenIssuer {
    pub fn new(settings: JwtSettings, clock: Arc<ClockPort>) -> ApplicationResult<Self> {
        if settings.signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ApplicationError::infrastructure(format!(
                "jwt signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes"
            )));
        }
        if settings.access_ttl <= Duration::zero() || settings.refresh_ttl <= Duration::zero() {
            return Err(ApplicationError::infrastructure(
                "token lifetimes must be positive",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&settings.signing_key),
            decoding_key: DecodingKey::from_secret(&settings.signing_key),
            validation,
            issuer: settings.issuer,
            audience: settings.audience,
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
            clock,
        })
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn generate_access_token(&self, subject: &TokenSubject) -> ApplicationResult<AccessToken> {
        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(self.access_ttl)
            .ok_or_else(|| ApplicationError::infrastructure("token expiration overflow"))?;

        let claims = AccessClaims {
            sub: subject.user_id.to_string(),
            username: subject.username.clone(),
            role: subject.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| {
                ApplicationError::infrastructure(format!("failed to sign access token: {err}"))
            })?;

        Ok(AccessToken {
            token,
            issued_at,
            expires_at,
        })
    }

    fn generate_refresh_token(&self) -> ApplicationResult<RefreshSecret> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| ApplicationError::infrastructure("refresh token expiration overflow"))?;

        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Ok(RefreshSecret::new(URL_SAFE_NO_PAD.encode(bytes), expires_at))
    }

    fn verify_access_token(&self, token: &str) -> ApplicationResult<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ApplicationError::unauthorized("access token expired"),
                _ => ApplicationError::unauthorized("invalid access token"),
            })
    }
}
