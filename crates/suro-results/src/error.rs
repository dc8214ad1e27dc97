//! # Result Pipeline Errors
//!
//! [`ResultError`] covers everything that can go wrong while one mapping is
//! being produced or persisted. The orchestrator never propagates these to
//! its caller: a failed mapping is logged and listed in the response message.
//! [`StoreError`] is the error surface of [`ResultStore`](crate::ResultStore)
//! implementations.

use thiserror::Error;

use suro_core::{ArtifactFormat, RunId};

/// Errors raised while producing or persisting a single artifact.
#[derive(Error, Debug)]
pub enum ResultError {
    /// The solution has no top-level field named by a source.
    #[error("solution has no field {solution_key:?}")]
    MissingSource {
        /// The missing solution key.
        solution_key: String,
    },

    /// A source's solution field exists but is not an array.
    #[error("solution field {solution_key:?} is not an array")]
    NotAnArray {
        /// The offending solution key.
        solution_key: String,
    },

    /// A mapper was asked for an artifact format it cannot produce.
    #[error("{mapper} mapper cannot produce {format} output for {file_name:?}")]
    UnsupportedOperation {
        /// Name of the mapper.
        mapper: String,
        /// The artifact format requested by the file name.
        format: ArtifactFormat,
        /// The mapping's file name.
        file_name: String,
    },

    /// No custom mapper is registered under the identifier.
    #[error("no custom mapper registered for {0:?}")]
    UnknownCustomMapper(String),

    /// A custom mapping did not name its mapper.
    #[error("custom mapping {0:?} does not name a transformer")]
    MissingCustomId(String),

    /// JSON serialization of a produced document failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisting the artifact failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for mapper and orchestrator operations.
pub type MapperResult<T> = Result<T, ResultError>;

/// Errors raised by result store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced run does not exist.
    #[error("run {0} not found")]
    RunNotFound(RunId),

    /// An attachment name is not a plain relative file name.
    #[error("attachment name {0:?} is not a plain relative file name")]
    InvalidFileName(String),

    /// An I/O operation on a backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
