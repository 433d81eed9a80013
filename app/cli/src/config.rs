//! Configuration resolution for the CLI.
//!
//! Resolves gateway.toml in priority order:
//! 1. `--config <path>` flag
//! 2. `{cwd}/.ragchat/gateway.toml`
//! 3. `~/.config/ragchat/gateway.toml`
//!
//! If none exists, the global default is generated with environment
//! placeholders for the API keys.

use anyhow::{Context, Result};
use gateway::{
    GatewayConfig,
    config::{CONFIG_FILE, global_config_dir, scaffold_config_dir},
};
use std::path::{Path, PathBuf};

/// Workspace-local config directory name.
pub const WORKSPACE_DIR: &str = ".ragchat";

/// Pick the first existing config file, in priority order.
///
/// An explicit flag always wins, whether or not the file exists.
pub fn locate(flag: Option<&Path>, cwd: &Path, global: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }

    let workspace = cwd.join(WORKSPACE_DIR).join(CONFIG_FILE);
    if workspace.exists() {
        return Some(workspace);
    }

    global
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Resolve the config path, generating the global default when missing.
pub fn resolve_path(flag: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let global = global_config_dir();
    if let Some(path) = locate(flag, &cwd, global.as_deref()) {
        return Ok(path);
    }

    let dir = global.context("no config directory available on this platform")?;
    let path = scaffold_config_dir(&dir)?;
    tracing::info!("generated default config at {}", path.display());
    Ok(path)
}

/// Resolve and load the gateway config.
pub fn resolve_config(flag: Option<&Path>) -> Result<GatewayConfig> {
    let path = resolve_path(flag)?;
    GatewayConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))
}
