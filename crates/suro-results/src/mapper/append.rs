//! # Matrix Append Mapper (`complex-append`)
//!
//! Like the matrix pivot, except that every entry matching a (row, column)
//! slot keeps its own cell, and every source contributes its own block of
//! columns. A source's block reserves as many slots per column as its most
//! crowded (row, column) pair needs, laid out column by column with the
//! column header repeated once per slot. Column headers carry the source's
//! own column label as prefix.
//!
//! Rows from all sources are merged under one [`ComplexKey`]: a row key
//! missing from a source has absent cells in that source's block.
//!
//! ```text
//! Item,Waiting 1,Waiting 1,Waiting 2,Treated 1
//! ortho,hip,knee,spine,3
//! cardio,,,,1
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use suro_core::{ArtifactFormat, ComplexKey, OutputMapping};

use crate::artifact::Table;
use crate::error::MapperResult;
use crate::extract::{collect_matches, fit_identity, header_prefix, source_entries, ColumnAxis};
use crate::validation::{
    check_axes, check_basics, check_column_cardinality, check_row_shapes, ValidationReport,
};

use super::RowMapper;

/// Matrix pivot keeping every matching entry, one column block per source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixAppendMapper;

impl RowMapper for MatrixAppendMapper {
    fn name(&self) -> &str {
        "complex-append"
    }

    fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        let mut report = check_basics(mapping, Some(ArtifactFormat::Csv));
        report.merge(check_axes(mapping, true));
        report.merge(check_row_shapes(mapping));
        report.merge(check_column_cardinality(mapping));
        report
    }

    fn produce_rows(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Table> {
        let mut header = header_prefix(&mapping.sources);
        let identity_width = header.len();

        let mut merged: IndexMap<ComplexKey, Vec<Option<String>>> = IndexMap::new();
        let mut width = 0;
        for source in &mapping.sources {
            let columns = ColumnAxis::from_sources(std::slice::from_ref(source), solution)?;
            let entries = source_entries(solution, &source.solution_key)?;
            let matched = collect_matches(source, entries, &columns);

            let slots = matched
                .values()
                .flat_map(|row| row.iter().map(Vec::len))
                .max()
                .unwrap_or(0)
                .max(1);
            tracing::debug!(
                file_name = %mapping.file_name,
                solution_key = %source.solution_key,
                columns = columns.len(),
                slots,
                "appending source block"
            );

            for column in columns.headers() {
                header.extend(std::iter::repeat(column.to_string()).take(slots));
            }
            for (key, cells) in matched {
                let row = merged.entry(key).or_default();
                row.resize(width, None);
                for values in cells {
                    let filled = values.len();
                    row.extend(values.into_iter().map(Some));
                    row.extend(std::iter::repeat(None).take(slots - filled));
                }
            }
            width += columns.len() * slots;
            for row in merged.values_mut() {
                row.resize(width, None);
            }
        }

        let mut table = Table::new(header);
        for (key, cells) in merged {
            let mut row = fit_identity(key.parts().iter().cloned(), identity_width);
            row.extend(cells);
            table.push_row(row);
        }
        Ok(table)
    }
}
