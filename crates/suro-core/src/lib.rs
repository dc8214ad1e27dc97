#![deny(missing_docs)]

//! # suro-core: Foundational Types for the Result Pipeline
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies: only `serde`, `serde_json`,
//! `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Declarative output mappings.** An [`OutputMapping`] describes one
//!    client-facing artifact (a CSV table or a JSON document) in terms of
//!    [`MappingSource`]s, each binding a named array of the solver's solution
//!    to a row [`AxisSpec`], an optional column [`AxisSpec`] and an optional
//!    [`ValueSpec`]. The mapping is read-only once loaded.
//!
//! 2. **Single [`MappingKind`] enum.** One closed set of mapper kinds with
//!    exhaustive `match` at every dispatch site. The wire identifiers
//!    (`complex`, `complex-append`, `json-category`, `key-to-column`,
//!    `transformer`) live in exactly one place.
//!
//! 3. **[`ComplexKey`] for composite identity.** Rows and columns that are
//!    identified by several fields use an ordered, immutable tuple of strings.
//!    Equality and hashing are component-wise and order-sensitive.
//!
//! 4. **Newtype identifiers.** You cannot pass a [`ModelId`] where a
//!    [`RunId`] is expected.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `suro-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod entity;
pub mod error;
pub mod identity;
pub mod key;
pub mod mapping;

// Re-export primary types at crate root for ergonomic imports.
pub use entity::{Attachment, Model, Run};
pub use error::{CoreResult, MappingError};
pub use identity::{ModelId, RunId};
pub use key::ComplexKey;
pub use mapping::{ArtifactFormat, AxisSpec, MappingKind, MappingSource, OutputMapping, ValueSpec};
