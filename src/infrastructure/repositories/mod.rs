// src/infrastructure/repositories/mod.rs
mod error;
mod memory;
mod refresh_tokens;
mod users;
mod verification_codes;

pub use error::map_sqlx;
use error::corrupt_row;
pub use memory::InMemoryAuthStore;
pub use refresh_tokens::PostgresRefreshTokenRepository;
pub use users::{PostgresRoleRepository, PostgresUserRepository};
pub use verification_codes::PostgresVerificationCodeRepository;
