// File: crates/services/pushkeeper_backend/src/main.rs
use pushkeeper_backend::{app, app_state::AppState};
use pushkeeper_common::logging;
use pushkeeper_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);
    // keep the guard alive or buffered file logs are lost
    let _log_guard = logging::init_with_config(&config.logging);

    let state = AppState::from_config(config.clone())
        .await
        .inspect_err(|e| logging::log_error(e, "Failed to initialize application state"))?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
