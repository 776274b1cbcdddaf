//! Command implementations for the sysfwd CLI

pub mod check;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use sysfwd_config::Config;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sysfwd/config.toml";

/// Load and validate the configuration at `path`
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    Config::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}
