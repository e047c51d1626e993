use super::{AuthCommandService, service::surface};
use crate::application::{
    dto::AuthTokenPair,
    error::{ApplicationError, ApplicationResult},
};

pub struct RefreshTokensCommand {
    pub refresh_token: String,
}

impl AuthCommandService {
    /// Exchange a refresh token for a new access/refresh pair. The presented
    /// token is revoked in the same transaction that stores its successor.
    pub async fn refresh_both_tokens(
        &self,
        command: RefreshTokensCommand,
    ) -> ApplicationResult<AuthTokenPair> {
        self.rotate_session(&command.refresh_token)
            .await
            .map_err(|err| surface("refresh_both_tokens", err))
    }

    async fn rotate_session(&self, presented: &str) -> ApplicationResult<AuthTokenPair> {
        let current = self.refresh_tokens.find_active(presented).await?;

        let user = self
            .user_repo
            .find_by_id(current.user_id)
            .await
            .map_err(ApplicationError::storage)?
            .ok_or_else(|| {
                ApplicationError::infrastructure(format!(
                    "integrity error: refresh token {} references missing user {}",
                    current.id, current.user_id
                ))
            })?;
        let role = self.resolve_role(&user).await?;

        let access = self.mint_access_token(&user, &role)?;
        let refresh = self.refresh_tokens.rotate(&current).await?;

        tracing::info!(user_id = %user.id, "session refreshed");
        Ok(AuthTokenPair::new(access, refresh))
    }
}
