//! # Flat Mapper (`key-to-column`)
//!
//! One output row per entry, one column per field. The header is the value
//! keys when declared, otherwise every field name found in the first
//! source's entries. Row entry keys are moved to the front, and a column
//! label list of matching length renames the header.

use indexmap::IndexSet;
use serde_json::Value;

use suro_core::{ArtifactFormat, OutputMapping};

use crate::artifact::Table;
use crate::error::MapperResult;
use crate::extract::{field_value, source_entries};
use crate::validation::{check_basics, warn_unused, ValidationReport};

use super::RowMapper;

/// Writes each entry as a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatMapper;

impl RowMapper for FlatMapper {
    fn name(&self) -> &str {
        "key-to-column"
    }

    fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        let mut report = check_basics(mapping, Some(ArtifactFormat::Csv));
        for source in &mapping.sources {
            if source.row.has_labels() {
                warn_unused(&mut report, &source.solution_key, "row label");
            }
            if let Some(column) = &source.column {
                if column.has_entry_keys() || !column.has_labels() {
                    warn_unused(&mut report, &source.solution_key, "column");
                }
            }
            if source.value.as_ref().is_some_and(|v| v.is_empty()) {
                warn_unused(&mut report, &source.solution_key, "value");
            }
        }
        report
    }

    fn produce_rows(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Table> {
        let Some(first) = mapping.sources.first() else {
            return Ok(Table::default());
        };

        let mut fields: IndexSet<String> = first.row.entry_keys().iter().cloned().collect();
        if !first.value_keys().is_empty() {
            fields.extend(first.value_keys().iter().cloned());
        } else {
            for entry in source_entries(solution, &first.solution_key)? {
                if let Some(object) = entry.as_object() {
                    fields.extend(object.keys().cloned());
                }
            }
        }

        let header: Vec<String> = match first.column.as_ref().map(|c| c.labels()) {
            Some(labels) if labels.len() == fields.len() => labels.to_vec(),
            Some(labels) if !labels.is_empty() => {
                tracing::warn!(
                    file_name = %mapping.file_name,
                    labels = labels.len(),
                    fields = fields.len(),
                    "column labels do not match the field count; keeping field names"
                );
                fields.iter().cloned().collect()
            }
            _ => fields.iter().cloned().collect(),
        };

        let mut table = Table::new(header);
        for source in &mapping.sources {
            for entry in source_entries(solution, &source.solution_key)? {
                table.push_row(fields.iter().map(|f| field_value(entry, f)).collect());
            }
        }
        Ok(table)
    }
}
