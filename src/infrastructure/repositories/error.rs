use crate::domain::errors::DomainError;

const CNT_USER_EMAIL: &str = "users_email_key";
const CNT_USER_EMAIL_LOWER: &str = "users_email_lower_key";
const CNT_REFRESH_TOKEN_DIGEST: &str = "refresh_tokens_token_digest_key";
const CNT_VERIFICATION_CODE_OPEN: &str = "verification_codes_one_open_key";
const CNT_VERIFICATION_CODE_KIND: &str = "verification_codes_kind_chk";

/// Rows read back from storage that fail their value-object checks are an
/// integrity problem of the store, never caller input.
pub(crate) fn corrupt_row(table: &'static str) -> impl Fn(DomainError) -> DomainError {
    move |err| DomainError::persistence(format!("corrupt {table} row: {err}"))
}

pub fn map_sqlx(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    CNT_USER_EMAIL | CNT_USER_EMAIL_LOWER => {
                        DomainError::Conflict("email already registered".into())
                    }
                    CNT_REFRESH_TOKEN_DIGEST => {
                        DomainError::Conflict("refresh token digest collision".into())
                    }
                    CNT_VERIFICATION_CODE_OPEN => DomainError::Conflict(
                        "an open verification code already exists".into(),
                    ),
                    CNT_VERIFICATION_CODE_KIND => {
                        DomainError::Validation("unknown verification kind".into())
                    }
                    other => {
                        DomainError::Persistence(format!("database constraint violation: {other}"))
                    }
                };
            }

            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23505" => {
                        return DomainError::Conflict("unique constraint violated".into());
                    }
                    "23503" => {
                        return DomainError::NotFound("referenced record not found".into());
                    }
                    "23514" => {
                        return DomainError::Validation("check constraint violated".into());
                    }
                    _ => {}
                }
            }

            DomainError::Persistence(db_err.message().to_string())
        }
        _ => DomainError::Persistence(err.to_string()),
    }
}
