//! # placement-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects storage, and serves
//! the HTTP API on `PORT` (default 8080).

use std::sync::Arc;

use placement_api::state::{AppConfig, AppState, LogFormat};
use placement_api::store::{MemoryRepository, PgRepository, WorkflowRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    // Initialize structured tracing.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(?config, "starting placement API");

    // Database is optional; absent means in-memory only.
    let db_pool = placement_api::db::init_pool(&config).await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let repo: Arc<dyn WorkflowRepository> = match db_pool {
        Some(pool) => Arc::new(PgRepository::new(pool)),
        None => Arc::new(MemoryRepository::new()),
    };

    let port = config.port;
    let app = placement_api::app(AppState::with_config(config, repo));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Placement API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
