pub mod auth;

pub use auth::{
    AccessClaims, AccessToken, AuthMessage, AuthTokenPair, IssuedRefreshToken, RefreshSecret,
    TokenSubject,
};
