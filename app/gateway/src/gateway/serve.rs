//! Shared gateway serve entrypoint, used by the binary, CLI and tests.

use crate::{GatewayConfig, gateway::Gateway, route};
use anyhow::Result;
use llm::LLM;
use retrieval::Retrieve;
use std::path::Path;
use tokio::sync::oneshot;

/// Handle returned by [`serve`]: holds the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the gateway is listening on.
    pub port: u16,
    /// Send a value to trigger graceful shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Join handle for the server task.
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Base URL of the running gateway on the loopback interface.
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Wait until the server stops on its own.
    pub async fn wait(mut self) -> Result<()> {
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }

    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Load config, build the gateway, bind the axum server and start serving
/// on the configured address.
pub async fn serve(config_path: &Path) -> Result<ServeHandle> {
    let config = GatewayConfig::load(config_path)?;
    tracing::info!("loaded configuration from {}", config_path.display());
    serve_with_config(&config, &config.bind_address()).await
}

/// Serve with an already-loaded config on `bind`.
pub async fn serve_with_config(config: &GatewayConfig, bind: &str) -> Result<ServeHandle> {
    let gateway = crate::build_gateway(config).await?;
    serve_gateway(gateway, bind).await
}

/// Serve an assembled gateway on `bind`.
///
/// The server runs in a spawned task; call `handle.shutdown()` to stop it.
pub async fn serve_gateway<P: LLM, R: Retrieve>(
    gateway: Gateway<P, R>,
    bind: &str,
) -> Result<ServeHandle> {
    let app = route::router(gateway);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("gateway listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
