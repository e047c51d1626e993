// src/application/ports/mod.rs
pub mod notification;
pub mod security;
pub mod time;

// Type aliases to make port injection sites more descriptive and reduce `dyn` noise
pub type PasswordHasherPort = dyn security::PasswordHasher;
pub type SecretDigesterPort = dyn security::SecretDigester;
pub type TokenIssuerPort = dyn security::TokenIssuer;
pub type NotificationSenderPort = dyn notification::NotificationSender;
pub type ClockPort = dyn time::Clock;
