// src/presentation/http/controllers/auth.rs
use crate::application::{
    commands::auth::{
        LoginCommand, LogoutCommand, RefreshTokensCommand, RequestPasswordResetCommand,
        ResetPasswordCommand,
    },
    dto::{AuthMessage, AuthTokenPair},
};
use crate::presentation::http::error::{HttpResult, IntoHttpResult};
use crate::presentation::http::extractors::Authenticated;
use crate::presentation::http::state::HttpState;
use axum::{Extension, Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

// Request bodies carry secrets, so none of them derive Debug.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl From<AuthMessage> for MessageResponse {
    fn from(message: AuthMessage) -> Self {
        Self {
            message: message.as_str(),
        }
    }
}

pub async fn login(
    Extension(state): Extension<HttpState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> HttpResult<Json<AuthTokenPair>> {
    let Json(payload) = payload?;
    let command = LoginCommand {
        email: payload.email,
        password: payload.password,
    };

    state
        .services
        .auth_commands
        .login(command)
        .await
        .into_http()
        .map(Json)
}

pub async fn refresh(
    Extension(state): Extension<HttpState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> HttpResult<Json<AuthTokenPair>> {
    let Json(payload) = payload?;
    let command = RefreshTokensCommand {
        refresh_token: payload.refresh_token,
    };

    state
        .services
        .auth_commands
        .refresh_both_tokens(command)
        .await
        .into_http()
        .map(Json)
}

pub async fn logout(
    Extension(state): Extension<HttpState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> HttpResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let message = state
        .services
        .auth_commands
        .logout(LogoutCommand {
            refresh_token: payload.refresh_token,
        })
        .await;

    Ok(Json(message.into()))
}

pub async fn logout_all(
    Extension(state): Extension<HttpState>,
    Authenticated(claims): Authenticated,
) -> HttpResult<Json<MessageResponse>> {
    state
        .services
        .auth_commands
        .logout_all(&claims)
        .await
        .into_http()
        .map(|message| Json(message.into()))
}

pub async fn request_password_reset(
    Extension(state): Extension<HttpState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> HttpResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let message = state
        .services
        .auth_commands
        .request_password_reset(RequestPasswordResetCommand {
            email: payload.email,
        })
        .await;

    Ok(Json(message.into()))
}

pub async fn reset_password(
    Extension(state): Extension<HttpState>,
    payload: Result<Json<PasswordResetConfirmRequest>, JsonRejection>,
) -> HttpResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let command = ResetPasswordCommand {
        email: payload.email,
        code: payload.code,
        new_password: payload.new_password,
        confirm_new_password: payload.confirm_new_password,
    };

    state
        .services
        .auth_commands
        .reset_password(command)
        .await
        .into_http()
        .map(|message| Json(message.into()))
}
