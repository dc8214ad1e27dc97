//! # Produced Artifacts
//!
//! A mapper produces either a [`Table`] (written as CSV) or a JSON document.
//! Artifacts are transient: they live only between production and
//! persistence.
//!
//! CSV output is a plain join. Fields are separated by `,` and rows by `\n`
//! with no trailing newline. Nothing is quoted or escaped, and absent cells
//! are written as empty text.

use serde_json::Value;

use suro_core::ArtifactFormat;

use crate::error::MapperResult;

/// A header row and body rows, every row the header's length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// An empty table with the given header.
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a body row, padded with absent cells or truncated to the
    /// header's length.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.header.len(), None);
        self.rows.push(row);
    }

    /// Header cells.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Render as CSV text.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.header.join(","));
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            lines.push(cells.join(","));
        }
        lines.join("\n")
    }
}

/// The output of one mapper run.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Tabular output.
    Table(Table),
    /// Document output.
    Document(Value),
}

impl Artifact {
    /// The serialized format.
    pub fn format(&self) -> ArtifactFormat {
        match self {
            Self::Table(_) => ArtifactFormat::Csv,
            Self::Document(_) => ArtifactFormat::Json,
        }
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> MapperResult<Vec<u8>> {
        match self {
            Self::Table(table) => Ok(table.to_csv().into_bytes()),
            Self::Document(value) => Ok(serde_json::to_vec(value)?),
        }
    }
}
