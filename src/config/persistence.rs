//! Config file location, loading and validation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::types::DashboardConfig;

/// `config.json` next to the executable.
pub fn default_config_path() -> Result<PathBuf> {
    let exe_dir = std::env::current_exe()?
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine executable directory"))?
        .to_path_buf();
    Ok(exe_dir.join("config.json"))
}

pub fn resolve_config_path(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(PathBuf::from(p)),
        None => default_config_path(),
    }
}

/// Load the config file, falling back to defaults when it does not exist.
/// Missing fields take their default values.
pub async fn load_config(path: Option<&str>) -> Result<DashboardConfig> {
    let config_path = resolve_config_path(path)?;

    let config = if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config: {:?}", config_path))?;
        let config = parse_config(&content)
            .with_context(|| format!("Invalid config: {:?}", config_path))?;
        info!("Loaded configuration from: {:?}", config_path);
        config
    } else {
        info!("Config file {:?} not found, using defaults", config_path);
        DashboardConfig::default()
    };

    Ok(config)
}

pub fn parse_config(content: &str) -> Result<DashboardConfig> {
    let config: DashboardConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Upper bound for `ipmi.timeout_secs` and `poller.interval_secs` (one day).
pub const MAX_DURATION_SECS: f64 = 86_400.0;

pub fn validate_config(config: &DashboardConfig) -> Result<()> {
    if config.ipmi.tool.trim().is_empty() {
        bail!("ipmi.tool must not be empty");
    }
    if config.ipmi.interface.trim().is_empty() {
        bail!("ipmi.interface must not be empty");
    }
    let timeout = config.ipmi.timeout_secs;
    if !(timeout > 0.0 && timeout <= MAX_DURATION_SECS) {
        bail!("ipmi.timeout_secs must be in (0, {}], got {}", MAX_DURATION_SECS, timeout);
    }
    let interval = config.poller.interval_secs;
    if !(interval >= 1.0 && interval <= MAX_DURATION_SECS) {
        bail!("poller.interval_secs must be in [1, {}], got {}", MAX_DURATION_SECS, interval);
    }
    Ok(())
}

pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}
