// src/presentation/http/routes.rs
use crate::config::{AppConfig, RateLimitSettings};
use crate::presentation::http::controllers::auth;
use crate::presentation::http::middleware::rate_limit::rate_limit_layer;
use crate::presentation::http::state::HttpState;
use axum::{
    Extension, Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use serde::Serialize;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: HttpState, config: &AppConfig) -> Router {
    build_router_with_rate_limiter(state, config.allowed_origins(), Some(config.rate_limit()))
}

/// Router with an explicit limiter choice. Passing `None` skips the limiter,
/// which needs the peer address from `ConnectInfo` and so cannot run under
/// `oneshot` in tests.
pub fn build_router_with_rate_limiter(
    state: HttpState,
    allowed_origins: &[String],
    rate_limit: Option<RateLimitSettings>,
) -> Router {
    let mut auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route(
            "/password-reset/request",
            post(auth::request_password_reset),
        )
        .route("/password-reset/confirm", post(auth::reset_password));

    if let Some(settings) = rate_limit {
        match rate_limit_layer(settings) {
            Some(limiter) => auth_routes = auth_routes.layer(limiter),
            None => tracing::warn!(?settings, "rate limit settings rejected; limiter disabled"),
        }
    }

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(Extension(state))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}
