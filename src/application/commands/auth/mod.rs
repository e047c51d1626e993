mod login;
mod logout;
mod password_reset;
mod refresh;
mod service;

pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use password_reset::{RequestPasswordResetCommand, ResetPasswordCommand};
pub use refresh::RefreshTokensCommand;
pub use service::AuthCommandService;
