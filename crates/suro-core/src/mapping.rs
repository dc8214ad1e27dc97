//! # Output Mapping Configuration
//!
//! The declarative description of how one solver solution becomes a
//! client-facing artifact. A [`Model`](crate::Model) carries a list of
//! [`OutputMapping`]s; each names a file, a [`MappingKind`], and the
//! [`MappingSource`]s that feed it.
//!
//! ## Wire Format
//!
//! ```json
//! {
//!   "fileName": "sessions.csv",
//!   "mappingType": "complex",
//!   "sources": [
//!     {
//!       "solutionKey": "sessions",
//!       "row":    { "entryKeys": ["specialty"] },
//!       "column": { "labels": ["Week"], "entryKeys": ["week"] },
//!       "value":  { "keys": ["count"] }
//!     }
//!   ],
//!   "transformer": null
//! }
//! ```
//!
//! All configuration is read-only once loaded. Nothing in this module
//! validates a mapping against a mapper's requirements; that happens in the
//! mapper itself, so one malformed mapping can be skipped without rejecting
//! the model that holds it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, MappingError};

// ---------------------------------------------------------------------------
// Axis and value specs
// ---------------------------------------------------------------------------

/// Describes one axis (rows or columns) of a produced table.
///
/// An axis has fixed literal `labels`, entry keys read from each solution
/// entry, or both. It is well-formed when at least one of the two lists is
/// present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entry_keys: Option<Vec<String>>,
}

impl AxisSpec {
    /// Build an axis spec from optional label and entry-key lists.
    pub fn new(labels: Option<Vec<String>>, entry_keys: Option<Vec<String>>) -> Self {
        Self { labels, entry_keys }
    }

    /// An axis made of literal labels only.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Some(labels.into_iter().map(Into::into).collect()), None)
    }

    /// An axis whose identity is read from the given entry fields.
    pub fn from_entry_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(None, Some(keys.into_iter().map(Into::into).collect()))
    }

    /// An axis read from entry fields whose headers are prefixed by `label`.
    pub fn labelled<I, S>(label: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Some(vec![label.into()]),
            Some(keys.into_iter().map(Into::into).collect()),
        )
    }

    /// Literal labels, empty when absent.
    pub fn labels(&self) -> &[String] {
        self.labels.as_deref().unwrap_or(&[])
    }

    /// Entry field names, empty when absent.
    pub fn entry_keys(&self) -> &[String] {
        self.entry_keys.as_deref().unwrap_or(&[])
    }

    /// Whether at least one literal label is declared.
    pub fn has_labels(&self) -> bool {
        !self.labels().is_empty()
    }

    /// Whether at least one entry key is declared.
    pub fn has_entry_keys(&self) -> bool {
        !self.entry_keys().is_empty()
    }

    /// Whether the axis can produce any identity at all.
    pub fn is_well_formed(&self) -> bool {
        self.has_labels() || self.has_entry_keys()
    }

    /// The larger of the label count and the entry-key count.
    pub fn cardinality(&self) -> usize {
        self.labels().len().max(self.entry_keys().len())
    }
}

/// The entry fields whose values become cell content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpec {
    /// Field names in output order.
    #[serde(default)]
    pub keys: Vec<String>,
}

impl ValueSpec {
    /// Build a value spec from field names.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether no value field is declared.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sources and mappings
// ---------------------------------------------------------------------------

/// Binds one top-level array of the solution to the axes of an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSource {
    /// Name of the top-level solution field holding the entry array.
    #[serde(default)]
    pub solution_key: String,
    /// Row axis.
    #[serde(default)]
    pub row: AxisSpec,
    /// Column axis.
    #[serde(default)]
    pub column: Option<AxisSpec>,
    /// Value fields.
    #[serde(default)]
    pub value: Option<ValueSpec>,
}

impl MappingSource {
    /// A source reading `solution_key` with the given row axis.
    pub fn new(solution_key: impl Into<String>, row: AxisSpec) -> Self {
        Self {
            solution_key: solution_key.into(),
            row,
            column: None,
            value: None,
        }
    }

    /// Set the column axis.
    pub fn with_column(mut self, column: AxisSpec) -> Self {
        self.column = Some(column);
        self
    }

    /// Set the value fields.
    pub fn with_value(mut self, value: ValueSpec) -> Self {
        self.value = Some(value);
        self
    }

    /// The declared value fields, empty when absent.
    pub fn value_keys(&self) -> &[String] {
        self.value.as_ref().map(|v| v.keys.as_slice()).unwrap_or(&[])
    }
}

/// The mapper family that interprets an [`OutputMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingKind {
    /// Matrix pivot: rows by row key, columns by column key, first match wins.
    #[serde(rename = "complex")]
    Matrix,
    /// Matrix pivot where every matching entry contributes its own slot.
    #[serde(rename = "complex-append")]
    MatrixAppend,
    /// JSON document grouping entries by category.
    #[serde(rename = "json-category")]
    Category,
    /// One row per entry, one column per field.
    #[serde(rename = "key-to-column")]
    Flat,
    /// A registered custom mapper resolved by identifier.
    #[serde(rename = "transformer")]
    Custom,
}

impl MappingKind {
    /// Returns all mapping kinds.
    pub fn all() -> &'static [MappingKind] {
        &[
            Self::Matrix,
            Self::MatrixAppend,
            Self::Category,
            Self::Flat,
            Self::Custom,
        ]
    }

    /// The wire identifier used in `mappingType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matrix => "complex",
            Self::MatrixAppend => "complex-append",
            Self::Category => "json-category",
            Self::Flat => "key-to-column",
            Self::Custom => "transformer",
        }
    }
}

impl std::fmt::Display for MappingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingKind {
    type Err = MappingError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| MappingError::UnknownKind(s.to_string()))
    }
}

/// One client-facing artifact produced from a solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMapping {
    /// Attachment name, including the extension.
    #[serde(default)]
    pub file_name: String,
    /// Mapper family.
    #[serde(rename = "mappingType")]
    pub kind: MappingKind,
    /// Sources in declaration order.
    #[serde(default)]
    pub sources: Vec<MappingSource>,
    /// Identifier of the registered custom mapper (custom kind only).
    #[serde(rename = "transformer", default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

impl OutputMapping {
    /// A mapping with no sources.
    pub fn new(file_name: impl Into<String>, kind: MappingKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            sources: Vec::new(),
            custom_id: None,
        }
    }

    /// Append a source.
    pub fn with_source(mut self, source: MappingSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Set the custom mapper identifier.
    pub fn with_custom_id(mut self, id: impl Into<String>) -> Self {
        self.custom_id = Some(id.into());
        self
    }

    /// The artifact format implied by the file extension, if any.
    pub fn format(&self) -> Option<ArtifactFormat> {
        ArtifactFormat::from_file_name(&self.file_name)
    }

    /// Parse a single mapping from JSON.
    pub fn from_json(input: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

// ---------------------------------------------------------------------------
// Artifact format
// ---------------------------------------------------------------------------

/// Serialized form of a produced artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Comma-joined rows.
    Csv,
    /// A JSON document.
    Json,
}

impl ArtifactFormat {
    /// Detect the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".csv") {
            Some(Self::Csv)
        } else if name.ends_with(".json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// The file extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Json => ".json",
        }
    }

    /// MIME type recorded on stored attachments.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

impl std::fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}
