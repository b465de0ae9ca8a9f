//! Path resolution utilities for shiftswap

use std::path::{Path, PathBuf};

/// File name of the service configuration in the working directory
pub const CONFIG_FILE_NAME: &str = "shiftswap.json";

/// Resolve the current working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Get the path to the default config file under `root`.
pub fn get_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Resolve the config file: an explicit path wins, otherwise the default under `cwd`.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => get_config_path(cwd),
    }
}

/// Resolve a data path from the config relative to the config's own directory.
pub fn resolve_data_path(config_path: &Path, data_path: &Path) -> PathBuf {
    if data_path.is_absolute() {
        return data_path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(data_path),
        None => data_path.to_path_buf(),
    }
}
