#![deny(missing_docs)]

//! # suro-results: Solution Result Mapping Engine
//!
//! Turns one solver solution into the client-facing artifacts a model
//! declares: CSV tables pivoted from schema-less JSON arrays, and
//! restructured JSON documents.
//!
//! ## Layers
//!
//! - [`extract`]: scalar rendering, composite key resolution, axis
//!   enumeration, header assembly, slot matching.
//! - [`validation`]: the shared mapping checks and [`ValidationReport`].
//! - [`mapper`]: [`MatrixMapper`], [`MatrixAppendMapper`],
//!   [`CategoryMapper`], [`FlatMapper`], the custom [`MapperRegistry`] and
//!   the bundled [`ScheduleMapper`].
//! - [`artifact`]: [`Table`] / [`Artifact`] and their serialized forms.
//! - [`store`]: the [`ResultStore`] seam and [`InMemoryStore`].
//! - [`orchestrator`]: [`ResultOrchestrator`], which runs every mapping
//!   of a model and reports through [`ProcessResponse`].
//!
//! ## Crate Policy
//!
//! - Mappers never mutate the solution and hold no state.
//! - One failing mapping never aborts the others.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod artifact;
pub mod config;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod orchestrator;
pub mod store;
pub mod validation;

pub use artifact::{Artifact, Table};
pub use config::{ConfigError, ResultsConfig};
pub use error::{MapperResult, ResultError, StoreError, StoreResult};
pub use mapper::{
    CategoryMapper, DocumentMapper, FlatMapper, Mapper, MapperFactory, MapperRegistry,
    MatrixAppendMapper, MatrixMapper, RowMapper, ScheduleMapper,
};
pub use orchestrator::{ProcessResponse, ResultOrchestrator};
pub use store::{InMemoryStore, ResultStore};
pub use validation::ValidationReport;
