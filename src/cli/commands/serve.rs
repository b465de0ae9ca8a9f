//! Serve command - Run the HTTP API

use std::path::Path;

use crate::api;
use crate::errors::Result;

use super::load_context;

/// Load config and the store, then serve until shutdown
pub async fn run(cwd: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let ctx = load_context(cwd, config)?;
    api::serve(&ctx.config, &ctx.data_path).await
}
