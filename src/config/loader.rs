//! Configuration loading with defaults

use std::path::Path;

use crate::calendar::store_offset;
use crate::errors::{Result, SchedulerError};
use crate::fs;
use crate::schemas::Config;

/// Environment variable that overrides `bind_addr`
pub const BIND_ADDR_ENV: &str = "SHIFTSWAP_BIND_ADDR";

/// Load configuration from `path`, falling back to defaults.
///
/// If the file exists, it is read and missing fields take their defaults.
/// The environment override is applied last, then the result is checked.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = fs::read_config(path)?;
    let config = apply_env_overrides(config, std::env::var(BIND_ADDR_ENV).ok());
    validate_config(&config)?;
    tracing::debug!(path = %path.display(), bind_addr = %config.bind_addr, "config loaded");
    Ok(config)
}

/// Apply an optional bind address override
pub fn apply_env_overrides(mut config: Config, bind_addr: Option<String>) -> Config {
    if let Some(addr) = bind_addr.filter(|a| !a.trim().is_empty()) {
        config.bind_addr = addr.trim().to_string();
    }
    config
}

fn validate_config(config: &Config) -> Result<()> {
    store_offset(config.utc_offset_minutes)?;
    if config.max_template_days == 0 {
        return Err(SchedulerError::ConfigError(
            "max_template_days must be at least 1".to_string(),
        ));
    }
    if config.bind_addr.trim().is_empty() {
        return Err(SchedulerError::ConfigError("bind_addr must not be empty".to_string()));
    }
    Ok(())
}
