use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{
    auth::RefreshTokenRecord,
    user::{Role, User, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub username: String,
    pub role: String,
}

impl TokenSubject {
    pub fn new(user: &User, role: &Role) -> Self {
        Self {
            user_id: user.id,
            username: user.username.to_string(),
            role: role.name.to_string(),
        }
    }
}

/// Claim set of a signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> ApplicationResult<UserId> {
        let raw: i64 = self
            .sub
            .parse()
            .map_err(|_| ApplicationError::unauthorized("invalid token subject"))?;
        UserId::new(raw).map_err(|_| ApplicationError::unauthorized("invalid token subject"))
    }
}

#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Plaintext refresh-token secret. Handed to the client exactly once and
/// never persisted.
#[derive(Clone)]
pub struct RefreshSecret {
    value: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshSecret {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSecret")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A freshly persisted refresh token together with its one-time plaintext.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub record: RefreshTokenRecord,
    pub secret: RefreshSecret,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenPair {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl AuthTokenPair {
    pub fn new(access: AccessToken, refresh: IssuedRefreshToken) -> Self {
        let refresh_token_expires_at = refresh.secret.expires_at;
        Self {
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: refresh.secret.into_inner(),
            refresh_token_expires_at,
        }
    }
}

impl fmt::Debug for AuthTokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokenPair")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .finish_non_exhaustive()
    }
}

/// Uniform outcome of the operations that must not reveal which internal
/// branch they took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMessage {
    LoggedOut,
    AllSessionsRevoked,
    PasswordResetRequested,
    PasswordResetCompleted,
}

impl AuthMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMessage::LoggedOut => "logged out",
            AuthMessage::AllSessionsRevoked => "all sessions have been signed out",
            AuthMessage::PasswordResetRequested => {
                "if an account exists for that email, a verification code has been sent"
            }
            AuthMessage::PasswordResetCompleted => "password has been reset",
        }
    }
}

impl fmt::Display for AuthMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> AccessClaims {
        AccessClaims {
            sub: sub.into(),
            username: "operator".into(),
            role: "technician".into(),
            iss: "ras".into(),
            aud: "ras-api".into(),
            iat: 0,
            exp: 0,
            jti: "j".into(),
        }
    }

    #[test]
    fn claims_subject_parses_into_user_id() {
        assert_eq!(i64::from(claims("42").user_id().unwrap()), 42);
        assert!(claims("0").user_id().unwrap_err().is_unauthorized());
        assert!(claims("tank-7").user_id().unwrap_err().is_unauthorized());
    }

    #[test]
    fn token_pair_debug_hides_secrets() {
        let pair = AuthTokenPair {
            access_token: "header.payload.sig".into(),
            access_token_expires_at: Utc::now(),
            refresh_token: "opaque-secret".into(),
            refresh_token_expires_at: Utc::now(),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("header.payload.sig"));
        assert!(!rendered.contains("opaque-secret"));
    }

    #[test]
    fn token_pair_serializes_in_camel_case() {
        let pair = AuthTokenPair {
            access_token: "a".into(),
            access_token_expires_at: Utc::now(),
            refresh_token: "r".into(),
            refresh_token_expires_at: Utc::now(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert!(json.get("refreshTokenExpiresAt").is_some());
    }
}
