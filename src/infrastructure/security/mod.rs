// src/infrastructure/security/mod.rs
pub mod digest;
pub mod password;
pub mod token;
