//! ragchat gateway binary entry point.
//!
//! Loads TOML configuration, builds the chain and runs the axum server
//! with graceful shutdown on ctrl-c.

use anyhow::Result;
use ragchat_gateway::{GatewayConfig, serve_with_config};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gateway.toml".to_string());
    let config = GatewayConfig::load(&config_path)?;
    tracing::info!("loaded configuration from {config_path}");

    let handle = serve_with_config(&config, &config.bind_address()).await?;
    shutdown_signal().await;
    handle.shutdown().await?;

    tracing::info!("gateway shut down");
    Ok(())
}

/// Wait for ctrl-c signal for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
    }
}
