//! Gaia Plant client composition root.
//!
//! Loads configuration, installs tracing and wires the infra adapters into
//! the application facade from `gaia-app`.

pub mod bootstrap;

use std::path::{Path, PathBuf};

use anyhow::Context;
use gaia_app::GaiaApp;
use gaia_core::config::AppConfig;

use bootstrap::wiring::default_data_dir;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GAIA_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Config path: explicit argument, then `GAIA_CONFIG`, then the data dir.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| default_data_dir().join(CONFIG_FILE_NAME))
}

/// Loads `path` when it exists and fills the gaps with system defaults.
pub fn effective_config(path: &Path) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::with_system_defaults(default_data_dir());
    if !path.exists() {
        return Ok(defaults);
    }
    let loaded = bootstrap::load_config(path)?;
    Ok(bootstrap::resolve_config(loaded, defaults))
}

/// Full startup: config, tracing, wiring.
pub fn start(explicit_config: Option<PathBuf>) -> anyhow::Result<GaiaApp> {
    let path = config_path(explicit_config);
    let config = effective_config(&path)?;
    bootstrap::init_tracing_subscriber(&config.log_dir)
        .context("Failed to initialize tracing")?;
    tracing::info!(config = %path.display(), "configuration loaded");
    bootstrap::build_app(&config).context("Failed to wire application")
}
