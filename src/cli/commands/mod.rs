//! CLI command implementations

pub mod serve;
pub mod user;

use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::errors::Result;
use crate::fs::{resolve_config_path, resolve_cwd, resolve_data_path};
use crate::schemas::Config;

/// Loaded configuration plus the resolved snapshot location
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub data_path: PathBuf,
}

/// Resolve the config file and data path shared by every command
pub fn load_context(cwd: Option<&Path>, config: Option<&Path>) -> Result<CommandContext> {
    let root = resolve_cwd(cwd);
    let config_path = resolve_config_path(config, &root);
    let config = load_config(&config_path)?;
    let data_path = resolve_data_path(&config_path, &config.data_path);
    Ok(CommandContext { config, data_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_context_defaults_under_cwd() {
        let temp = TempDir::new().unwrap();
        let ctx = load_context(Some(temp.path()), None).unwrap();
        assert_eq!(ctx.data_path, temp.path().join("data/shiftswap.json"));
    }

    #[test]
    fn test_load_context_explicit_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.json");
        std::fs::write(&config_path, r#"{"data_path": "store.json"}"#).unwrap();

        let ctx = load_context(None, Some(&config_path)).unwrap();
        assert_eq!(ctx.data_path, temp.path().join("store.json"));
    }
}
