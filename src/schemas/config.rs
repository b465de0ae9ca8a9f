//! Config schema - Configuration for the shiftswap service

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration for shiftswap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Address the HTTP API listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// JSON snapshot file backing the store
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Store time zone as minutes east of UTC
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Longest date range accepted by templated shift generation
    #[serde(default = "default_max_template_days")]
    pub max_template_days: u32,
}

fn default_schema_version() -> u32 {
    1
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/shiftswap.json")
}

fn default_utc_offset_minutes() -> i32 {
    540
}

fn default_max_template_days() -> u32 {
    366
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_version: default_schema_version(),
            bind_addr: default_bind_addr(),
            data_path: default_data_path(),
            utc_offset_minutes: default_utc_offset_minutes(),
            max_template_days: default_max_template_days(),
        }
    }
}
