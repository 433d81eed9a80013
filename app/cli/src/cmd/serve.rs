//! `ragchat serve`: run the gateway until ctrl-c.

use crate::config::resolve_config;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Start the gateway server.
#[derive(Args, Debug)]
pub struct Serve {
    /// Bind address; overrides `[server]` in the config.
    #[arg(long)]
    pub bind: Option<String>,
}

impl Serve {
    /// Serve until interrupted.
    pub async fn run(self, config: Option<&Path>) -> Result<()> {
        let config = resolve_config(config)?;
        let bind = self.bind.unwrap_or_else(|| config.bind_address());
        let handle = gateway::serve_with_config(&config, &bind).await?;
        println!("gateway listening on {}", handle.url());

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutting down gateway");
        handle.shutdown().await
    }
}
