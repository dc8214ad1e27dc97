//! # Error Hierarchy
//!
//! Structured error types for configuration and entity loading, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.

use thiserror::Error;

/// Errors raised while reading mapping configuration or entity identifiers.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The `mappingType` identifier is not one of the known mapper kinds.
    #[error("unknown mapping type {0:?}")]
    UnknownKind(String),

    /// An identifier could not be parsed.
    #[error("invalid {kind} identifier {input:?}: {reason}")]
    InvalidIdentifier {
        /// The identifier namespace (e.g. "run", "model").
        kind: &'static str,
        /// The rejected input.
        input: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// JSON deserialization of a model or mapping failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, MappingError>;
