//! File system utilities for shiftswap
//!
//! Provides path resolution and JSON file operations.

mod json;
mod paths;

pub use json::{read_config, read_json, write_json};
pub use paths::{
    get_config_path, resolve_config_path, resolve_cwd, resolve_data_path, CONFIG_FILE_NAME,
};
