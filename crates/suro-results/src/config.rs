//! Result pipeline configuration.
//!
//! Loaded from the environment with defaults. Command-line flags take
//! precedence and are applied by the binary.

use std::path::PathBuf;

use crate::mapper::MapperRegistry;

/// Default root directory for file-backed attachments.
pub const DEFAULT_RESULTS_DIR: &str = "dist/results";

/// Configuration for the result pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsConfig {
    /// Root directory under which file-backed stores write attachments.
    pub results_dir: PathBuf,
    /// Additional transformer identifiers, as `(alias, registered id)`.
    pub transformer_aliases: Vec<(String, String)>,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            transformer_aliases: Vec::new(),
        }
    }
}

impl ResultsConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SURO_RESULTS_DIR` (default: `dist/results`)
    /// - `SURO_TRANSFORMERS` (default: none), comma-separated `alias=id` pairs
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("SURO_RESULTS_DIR").ok().as_deref(),
            std::env::var("SURO_TRANSFORMERS").ok().as_deref(),
        )
    }

    fn from_vars(results_dir: Option<&str>, transformers: Option<&str>) -> Result<Self, ConfigError> {
        let results_dir = match results_dir {
            Some(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::Empty("SURO_RESULTS_DIR".to_string()))
            }
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(DEFAULT_RESULTS_DIR),
        };
        let transformer_aliases = match transformers {
            Some(raw) => parse_aliases(raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            results_dir,
            transformer_aliases,
        })
    }

    /// Register the configured aliases on `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTransformer`] when an alias targets an
    /// identifier the registry does not hold.
    pub fn apply_aliases(&self, registry: &mut MapperRegistry) -> Result<(), ConfigError> {
        for (alias, target) in &self.transformer_aliases {
            if !registry.contains(target) {
                return Err(ConfigError::UnknownTransformer {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
            registry.alias(alias.clone(), target.clone());
        }
        Ok(())
    }
}

fn parse_aliases(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((alias, id)) if !alias.trim().is_empty() && !id.trim().is_empty() => {
                Ok((alias.trim().to_string(), id.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidAlias(pair.to_string())),
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to blank text.
    #[error("{0} must not be empty")]
    Empty(String),
    /// A transformer alias pair is malformed.
    #[error("invalid transformer alias {0:?}, expected alias=id")]
    InvalidAlias(String),
    /// A transformer alias targets nothing registered.
    #[error("transformer alias {alias:?} targets unregistered mapper {target:?}")]
    UnknownTransformer {
        /// The alias being registered.
        alias: String,
        /// The missing target identifier.
        target: String,
    },
}
