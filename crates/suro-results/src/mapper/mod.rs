//! # Mappers
//!
//! A mapper interprets one [`OutputMapping`] against a solution. Tabular
//! mappers implement [`RowMapper`]; document mappers implement
//! [`DocumentMapper`]. A [`Mapper`] handle wraps either, so asking a
//! document mapper for rows is not expressible.
//!
//! ## Built-in Mappers
//!
//! | kind                         | mapper                 | output |
//! |------------------------------|------------------------|--------|
//! | [`MappingKind::Matrix`]      | [`MatrixMapper`]       | CSV    |
//! | [`MappingKind::MatrixAppend`]| [`MatrixAppendMapper`] | CSV    |
//! | [`MappingKind::Category`]    | [`CategoryMapper`]     | JSON   |
//! | [`MappingKind::Flat`]        | [`FlatMapper`]         | CSV    |
//!
//! [`MappingKind::Custom`] mappings are resolved through a
//! [`MapperRegistry`] by their transformer identifier.
//!
//! Mappers are stateless, `Send + Sync`, and never mutate the solution.

pub mod append;
pub mod category;
pub mod custom;
pub mod flat;
pub mod matrix;
pub mod schedule;

use std::sync::Arc;

use serde_json::Value;

use suro_core::{ArtifactFormat, MappingKind, OutputMapping};

use crate::artifact::{Artifact, Table};
use crate::error::MapperResult;
use crate::validation::ValidationReport;

pub use append::MatrixAppendMapper;
pub use category::CategoryMapper;
pub use custom::{MapperFactory, MapperRegistry};
pub use flat::FlatMapper;
pub use matrix::MatrixMapper;
pub use schedule::ScheduleMapper;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A mapper that produces a CSV table.
pub trait RowMapper: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Check whether the mapping can be interpreted by this mapper.
    fn check(&self, mapping: &OutputMapping) -> ValidationReport;

    /// Produce the table. Only called after a successful validation.
    fn produce_rows(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Table>;

    /// Check the mapping and log the findings.
    fn validate(&self, mapping: &OutputMapping) -> bool {
        self.check(mapping).accept(self.name(), &mapping.file_name)
    }
}

/// A mapper that produces a JSON document.
pub trait DocumentMapper: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Check whether the mapping can be interpreted by this mapper.
    fn check(&self, mapping: &OutputMapping) -> ValidationReport;

    /// Produce the document. Only called after a successful validation.
    fn produce_document(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Value>;

    /// Check the mapping and log the findings.
    fn validate(&self, mapping: &OutputMapping) -> bool {
        self.check(mapping).accept(self.name(), &mapping.file_name)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// A resolved mapper of either capability.
#[derive(Clone)]
pub enum Mapper {
    /// Produces a table.
    Rows(Arc<dyn RowMapper>),
    /// Produces a document.
    Document(Arc<dyn DocumentMapper>),
}

impl Mapper {
    /// Wrap a row mapper.
    pub fn rows(mapper: impl RowMapper + 'static) -> Self {
        Self::Rows(Arc::new(mapper))
    }

    /// Wrap a document mapper.
    pub fn document(mapper: impl DocumentMapper + 'static) -> Self {
        Self::Document(Arc::new(mapper))
    }

    /// The built-in mapper for a kind. Custom mappings have none.
    pub fn builtin(kind: MappingKind) -> Option<Self> {
        match kind {
            MappingKind::Matrix => Some(Self::rows(MatrixMapper)),
            MappingKind::MatrixAppend => Some(Self::rows(MatrixAppendMapper)),
            MappingKind::Category => Some(Self::document(CategoryMapper)),
            MappingKind::Flat => Some(Self::rows(FlatMapper)),
            MappingKind::Custom => None,
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Rows(m) => m.name(),
            Self::Document(m) => m.name(),
        }
    }

    /// The format this mapper produces.
    pub fn format(&self) -> ArtifactFormat {
        match self {
            Self::Rows(_) => ArtifactFormat::Csv,
            Self::Document(_) => ArtifactFormat::Json,
        }
    }

    /// Check the mapping without logging.
    pub fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        match self {
            Self::Rows(m) => m.check(mapping),
            Self::Document(m) => m.check(mapping),
        }
    }

    /// Check the mapping and log the findings.
    pub fn validate(&self, mapping: &OutputMapping) -> bool {
        match self {
            Self::Rows(m) => m.validate(mapping),
            Self::Document(m) => m.validate(mapping),
        }
    }

    /// Run the mapper.
    pub fn produce(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Artifact> {
        match self {
            Self::Rows(m) => m.produce_rows(mapping, solution).map(Artifact::Table),
            Self::Document(m) => m.produce_document(mapping, solution).map(Artifact::Document),
        }
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Mapper")
            .field(&self.name())
            .field(&self.format())
            .finish()
    }
}
