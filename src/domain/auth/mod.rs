// src/domain/auth/mod.rs
pub mod refresh_token;
pub mod repository;
pub mod value_objects;
pub mod verification_code;

pub use refresh_token::{NewRefreshToken, RefreshTokenRecord, RefreshTokenState};
pub use repository::{RefreshTokenRepository, VerificationCodeRepository};
pub use value_objects::{RefreshTokenId, TokenDigest, VerificationCodeId, VerificationKind};
pub use verification_code::{CodeRedemption, NewVerificationCode, VerificationCodeRecord};
