use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use manhwa_api::config;
use manhwa_api::database::{DatabaseManager, PgChapterStore};
use manhwa_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting Manhwa API in {:?} mode", config.environment);
    if config.security.admin_key.is_empty() {
        tracing::warn!("ADMIN_KEY is not set; /admin and /moderator will reject every request");
    }
    if is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin in production");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let chapters = Arc::new(PgChapterStore::new(pool.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(pool, chapters, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Manhwa API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
