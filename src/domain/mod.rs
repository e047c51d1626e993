// src/domain/mod.rs
pub mod auth;
pub mod errors;
pub mod user;
