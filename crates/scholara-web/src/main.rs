//! Scholara server
//!
//! Run with: cargo run -p scholara-web

use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scholara_web::config::Config;
use scholara_web::router::build_router;
use scholara_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; keys may already be in the environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scholara=debug,info")),
        )
        .init();

    info!("Scholara starting up, version {}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not load scholara.toml: {e}");
            warn!("Copy scholara.example.toml to scholara.toml and edit it.");
            return Ok(());
        }
    };
    info!(
        default_backend = %config.llm.default_backend,
        literature = ?config.literature.source,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
