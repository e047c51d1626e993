use super::{AuthCommandService, service::surface};
use crate::application::{
    dto::AuthTokenPair,
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::user::Email;

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl AuthCommandService {
    pub async fn login(&self, command: LoginCommand) -> ApplicationResult<AuthTokenPair> {
        self.authenticate_and_issue(command)
            .await
            .map_err(|err| surface("login", err))
    }

    async fn authenticate_and_issue(&self, command: LoginCommand) -> ApplicationResult<AuthTokenPair> {
        let Ok(email) = Email::parse(&command.email) else {
            return Err(ApplicationError::unauthorized(INVALID_CREDENTIALS));
        };

        let user = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(ApplicationError::storage)?;

        // Unknown account and wrong password take the same path and cost.
        let is_valid = match &user {
            Some(user) => {
                self.credentials
                    .verify_password(&command.password, user.password_hash.as_str())
                    .await?
            }
            None => {
                self.credentials.verify_decoy(&command.password).await;
                false
            }
        };

        let user = match user {
            Some(user) if is_valid => user,
            _ => {
                tracing::info!("login rejected");
                return Err(ApplicationError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let role = self.resolve_role(&user).await?;
        let access = self.mint_access_token(&user, &role)?;
        let refresh = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthTokenPair::new(access, refresh))
    }
}
