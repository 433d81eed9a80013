//! `ragchat config`: scaffold and inspect gateway.toml.

use super::ConfigCommand;
use crate::config::{WORKSPACE_DIR, resolve_path};
use anyhow::{Result, bail};
use gateway::config::{CONFIG_FILE, scaffold_config_dir};
use std::path::{Path, PathBuf};

/// Run a config subcommand.
pub fn run(action: &ConfigCommand, flag: Option<&Path>) -> Result<()> {
    match action {
        ConfigCommand::Init { force } => {
            let dir = match flag {
                Some(path) => path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
                None => PathBuf::from(WORKSPACE_DIR),
            };
            let path = init(&dir, *force)?;
            println!("wrote {}", path.display());
        }
        ConfigCommand::Show => {
            let path = resolve_path(flag)?;
            println!("# {}", path.display());
            print!("{}", std::fs::read_to_string(&path)?);
        }
    }
    Ok(())
}

/// Write a default gateway.toml into `dir`, refusing to clobber one
/// unless `force` is set.
pub fn init(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }
    scaffold_config_dir(dir)
}
