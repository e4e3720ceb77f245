mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::logging::LoggingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).context("failed to build providers")?;
    let app = app::create_app(state);

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 WhatIfIBought backend running at http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
