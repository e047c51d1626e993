use super::{AuthCommandService, service::surface};
use crate::application::{
    auth::INVALID_VERIFICATION_CODE,
    dto::AuthMessage,
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::{
    auth::{CodeRedemption, VerificationKind},
    user::{Email, PasswordHash},
};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

pub struct RequestPasswordResetCommand {
    pub email: String,
}

pub struct ResetPasswordCommand {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl AuthCommandService {
    /// Always answers with the same message. When the account exists a fresh
    /// code is committed first and delivered afterwards; a delivery failure
    /// leaves the committed code in place.
    pub async fn request_password_reset(&self, command: RequestPasswordResetCommand) -> AuthMessage {
        if let Err(err) = self.issue_reset_code(&command.email).await {
            let _ = surface("request_password_reset", err);
        }

        AuthMessage::PasswordResetRequested
    }

    pub async fn reset_password(&self, command: ResetPasswordCommand) -> ApplicationResult<AuthMessage> {
        self.redeem_reset_code(command)
            .await
            .map_err(|err| surface("reset_password", err))
    }

    async fn issue_reset_code(&self, raw_email: &str) -> ApplicationResult<()> {
        let Ok(email) = Email::parse(raw_email) else {
            tracing::debug!("password reset requested with malformed email");
            return Ok(());
        };
        let Some(user) = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(ApplicationError::storage)?
        else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let code = self
            .verification_codes
            .issue(user.id, VerificationKind::PasswordReset)
            .await?;

        if let Err(err) = self
            .notifier
            .send_verification_code(&user.email, VerificationKind::PasswordReset, &code)
            .await
        {
            tracing::warn!(
                user_id = %user.id,
                error = %err,
                "password reset code delivery failed; the issued code stays valid"
            );
        } else {
            tracing::info!(user_id = %user.id, "password reset code issued");
        }

        Ok(())
    }

    async fn redeem_reset_code(&self, command: ResetPasswordCommand) -> ApplicationResult<AuthMessage> {
        if command.new_password != command.confirm_new_password {
            return Err(ApplicationError::bad_request(
                "new password and confirmation do not match",
            ));
        }
        validate_password(&command.new_password)?;

        let Ok(email) = Email::parse(&command.email) else {
            return Err(ApplicationError::unauthorized(INVALID_VERIFICATION_CODE));
        };
        let user = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(ApplicationError::storage)?
            .ok_or_else(|| ApplicationError::unauthorized(INVALID_VERIFICATION_CODE))?;

        let code = self
            .verification_codes
            .verify(user.id, VerificationKind::PasswordReset, &command.code)
            .await?;

        // Only a matching code pays for the password hash.
        let new_password_hash = self
            .credentials
            .hash_password(&command.new_password)
            .await
            .and_then(|hash| {
                PasswordHash::new(hash).map_err(|err| {
                    ApplicationError::infrastructure(format!("password hasher misbehaved: {err}"))
                })
            })?;

        self.verification_codes
            .redeem(&code, CodeRedemption::PasswordReset { new_password_hash })
            .await?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(AuthMessage::PasswordResetCompleted)
    }
}

fn validate_password(password: &str) -> ApplicationResult<()> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ApplicationError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(ApplicationError::bad_request(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}
