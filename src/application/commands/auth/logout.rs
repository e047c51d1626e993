use super::{AuthCommandService, service::surface};
use crate::application::{
    dto::{AccessClaims, AuthMessage},
    error::ApplicationResult,
};

pub struct LogoutCommand {
    pub refresh_token: String,
}

impl AuthCommandService {
    /// Best-effort revocation. Reports success whether or not the token
    /// existed, so logout cannot be used to probe for valid tokens.
    pub async fn logout(&self, command: LogoutCommand) -> AuthMessage {
        match self.refresh_tokens.revoke(&command.refresh_token).await {
            Ok(true) => tracing::info!("refresh token revoked on logout"),
            Ok(false) => tracing::debug!("logout with unknown or inactive refresh token"),
            Err(err) => {
                let _ = surface("logout", err);
            }
        }

        AuthMessage::LoggedOut
    }

    /// Revoke every refresh token of the holder of `claims`.
    pub async fn logout_all(&self, claims: &AccessClaims) -> ApplicationResult<AuthMessage> {
        self.revoke_all_sessions(claims)
            .await
            .map_err(|err| surface("logout_all", err))
    }

    async fn revoke_all_sessions(&self, claims: &AccessClaims) -> ApplicationResult<AuthMessage> {
        let user_id = claims.user_id()?;
        self.refresh_tokens.revoke_all(user_id).await?;
        Ok(AuthMessage::AllSessionsRevoked)
    }
}
