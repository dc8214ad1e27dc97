//! # suro-cli: CLI Tool for the Result Mapping Engine
//!
//! Provides the `suro` command-line interface.
//!
//! ## Subcommands
//!
//! - `suro validate`: Check every output mapping of a model file.
//! - `suro store`: Map a solution file into attachments on disk.
//!
//! ```bash
//! suro validate models/elective.yaml
//! suro store models/elective.yaml runs/solution.json --results-dir out/
//! ```

pub mod dir_store;
pub mod model;
pub mod store;
pub mod validate;

use anyhow::{Context, Result};

use suro_results::{MapperRegistry, ResultsConfig};

/// Build the custom mapper registry: bundled mappers plus configured aliases.
pub fn build_registry(config: &ResultsConfig) -> Result<MapperRegistry> {
    let mut registry = MapperRegistry::with_builtins();
    config
        .apply_aliases(&mut registry)
        .context("invalid SURO_TRANSFORMERS")?;
    tracing::debug!(ids = ?registry.ids(), "custom mappers registered");
    Ok(registry)
}
