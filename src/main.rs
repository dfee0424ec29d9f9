use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::response::IntoResponse;
use radar_backend::{
    app,
    config::Config,
    db::{
        postgres_token_repository::PostgresTokenRepository,
        postgres_user_repository::PostgresUserRepository, schema,
    },
    responses::JsonResponse,
    services::mailer::{BrevoClient, EmailDispatcher, EmailTemplates},
    session::SessionStore,
    worker, AppState,
};
use reqwest::Client;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;

    let pg_pool = establish_connection(&config.database_url).await?;
    if let Err(e) = schema::create_tables(&pg_pool).await {
        error!(error = %e, "Failed to check/create tables");
    }

    let http_client = Client::new();
    let provider = Arc::new(BrevoClient::new(
        &http_client,
        &config.email.brevo_api_url,
        &config.email.brevo_api_key,
    ));
    let mailer = Arc::new(EmailDispatcher::new(
        provider,
        config.email.sender.clone(),
        EmailTemplates::new(&config.base_url),
    ));

    let state = AppState {
        db: Arc::new(PostgresUserRepository {
            pool: pg_pool.clone(),
        }),
        tokens: Arc::new(PostgresTokenRepository { pool: pg_pool }),
        mailer,
        sessions: Arc::new(SessionStore::new(config.session_ttl)),
        config: Arc::new(config),
    };

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(10)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Muitas requisições. Aguarde um momento e tente novamente.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter configuration")?,
    );

    let governor_limiter = governor_conf.limiter().clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_secs(60));
        governor_limiter.retain_recent();
    });

    let usuario = app::usuario_routes().layer(GovernorLayer {
        config: governor_conf,
    });
    let router = app::build_router_with(state.clone(), usuario);

    worker::start_background_workers(state.clone()).await;

    let addr = state.config.bind_addr;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;
    Ok(())
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    info!("Successfully connected to the database");
    Ok(pool)
}
