use ras_core::application::{
    ports::{
        ClockPort, NotificationSenderPort, PasswordHasherPort, SecretDigesterPort, TokenIssuerPort,
    },
    services::{ApplicationServices, AuthRepositories, SecurityPorts},
};
use ras_core::config::AppConfig;
use ras_core::infrastructure::{
    database,
    notification::LoggingNotificationSender,
    repositories::{
        PostgresRefreshTokenRepository, PostgresRoleRepository, PostgresUserRepository,
        PostgresVerificationCodeRepository,
    },
    security::{
        digest::HmacSecretDigester, password::Argon2PasswordHasher, token::JwtTokenIssuer,
    },
    time::SystemClock,
};
use ras_core::presentation::http::{routes::build_router, state::HttpState};
use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let auth = config.auth();

    let pool = database::init_pool(config.database_url(), config.database_max_connections()).await?;
    database::run_migrations(&pool).await?;

    let repositories = AuthRepositories {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
        refresh_tokens: Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
        verification_codes: Arc::new(PostgresVerificationCodeRepository::new(pool)),
    };

    let clock: Arc<ClockPort> = Arc::new(SystemClock);
    let password_hasher: Arc<PasswordHasherPort> =
        Arc::new(Argon2PasswordHasher::new(auth.argon2_cost())?);
    let digester: Arc<SecretDigesterPort> =
        Arc::new(HmacSecretDigester::new(auth.token_digest_key())?);
    let token_issuer: Arc<TokenIssuerPort> =
        Arc::new(JwtTokenIssuer::new(auth.jwt_settings(), Arc::clone(&clock))?);
    let notifier: Arc<NotificationSenderPort> = Arc::new(LoggingNotificationSender);

    let services = Arc::new(ApplicationServices::new(
        repositories,
        SecurityPorts {
            password_hasher,
            digester,
            token_issuer,
            notifier,
            clock,
        },
        auth.verification_policy(),
    ));

    let state = HttpState { services };
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    let address: SocketAddr = listener.local_addr()?;
    tracing::info!("listening on {address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,tower_http=info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
