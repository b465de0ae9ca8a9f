//! Service configuration

mod loader;

pub use loader::{apply_env_overrides, load_config, BIND_ADDR_ENV};
