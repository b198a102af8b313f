use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use eventboard::{
    config::AppConfig,
    db,
    routes::{build_router, cors_layer, normalize_paths},
    services::TokenService,
    AppState,
};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "eventboard=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Database connection
    let pool = db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let token_service = TokenService::from_config(&config.token);
    let app_state = AppState::new(pool, token_service);

    let router = build_router(app_state).layer(cors_layer(config.cors_allowed_origin.as_deref())?);
    let app = normalize_paths(router);

    // Start server
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
