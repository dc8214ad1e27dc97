//! # Matrix Mapper (`complex`)
//!
//! Pivots entries into a table: one body row per row identity, one column
//! per distinct column key discovered across all sources. When several
//! entries land in the same (row, column) slot, the first one in array order
//! supplies the cell.
//!
//! ```text
//! Item,Week 1,Week 2
//! ortho,3,4
//! cardio,1,
//! ```

use serde_json::Value;

use suro_core::{ArtifactFormat, OutputMapping};

use crate::artifact::Table;
use crate::error::MapperResult;
use crate::extract::{
    collect_matches, first_matches, fit_identity, header_prefix, source_entries, ColumnAxis,
};
use crate::validation::{
    check_axes, check_basics, check_column_cardinality, check_row_shapes, ValidationReport,
};

use super::RowMapper;

/// First-match matrix pivot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixMapper;

impl RowMapper for MatrixMapper {
    fn name(&self) -> &str {
        "complex"
    }

    fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        let mut report = check_basics(mapping, Some(ArtifactFormat::Csv));
        report.merge(check_axes(mapping, true));
        report.merge(check_row_shapes(mapping));
        report.merge(check_row_cardinality(mapping));
        report.merge(check_column_cardinality(mapping));
        report
    }

    fn produce_rows(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Table> {
        let columns = ColumnAxis::from_sources(&mapping.sources, solution)?;
        let mut header = header_prefix(&mapping.sources);
        let identity_width = header.len();
        header.extend(columns.headers().map(str::to_string));

        let mut table = Table::new(header);
        for source in &mapping.sources {
            let entries = source_entries(solution, &source.solution_key)?;
            let matches = collect_matches(source, entries, &columns);
            tracing::debug!(
                solution_key = %source.solution_key,
                entries = entries.len(),
                rows = matches.len(),
                "pivoted source"
            );
            for (key, slots) in matches {
                let mut row = fit_identity(key.parts().iter().cloned(), identity_width);
                row.extend(first_matches(slots));
                table.push_row(row);
            }
        }
        Ok(table)
    }
}

/// Every row axis declares as many labels or entry keys as the first.
pub(crate) fn check_row_cardinality(mapping: &OutputMapping) -> ValidationReport {
    let mut report = ValidationReport::ok();
    let mut sources = mapping.sources.iter();
    let Some(first) = sources.next() else {
        return report;
    };
    let expected = first.row.cardinality();
    for source in sources {
        let actual = source.row.cardinality();
        if actual != expected {
            report.add_error(format!(
                "source {:?} has row mapping size {actual}, expected {expected}",
                source.solution_key
            ));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use suro_core::{AxisSpec, MappingKind, MappingSource, ValueSpec};

    use super::*;

    fn sessions_mapping() -> OutputMapping {
        OutputMapping::new("sessions.csv", MappingKind::Matrix).with_source(
            MappingSource::new("sessions", AxisSpec::from_entry_keys(["unit"]))
                .with_column(AxisSpec::labelled("Week", ["week"]))
                .with_value(ValueSpec::new(["count"])),
        )
    }

    fn solution() -> Value {
        json!({
            "sessions": [
                {"unit": "ortho", "week": 1, "count": 3},
                {"unit": "ortho", "week": 2, "count": 4},
                {"unit": "cardio", "week": 1, "count": 1},
                {"unit": "ortho", "week": 1, "count": 99}
            ]
        })
    }

    #[test]
    fn pivots_keyed_rows() {
        let table = MatrixMapper.produce_rows(&sessions_mapping(), &solution()).unwrap();
        assert_eq!(table.to_csv(), "Item,Week 1,Week 2\northo,3,4\ncardio,1,");
    }

    #[test]
    fn first_match_wins_on_duplicate_slot() {
        let table = MatrixMapper.produce_rows(&sessions_mapping(), &solution()).unwrap();
        assert_eq!(table.rows()[0][1].as_deref(), Some("3"));
    }

    #[test]
    fn single_label_sources_stack_rows() {
        let mapping = OutputMapping::new("totals.csv", MappingKind::Matrix)
            .with_source(
                MappingSource::new("theatres", AxisSpec::from_labels(["Theatres"]))
                    .with_column(AxisSpec::from_entry_keys(["period"]))
                    .with_value(ValueSpec::new(["n"])),
            )
            .with_source(
                MappingSource::new("beds", AxisSpec::from_labels(["Beds"]))
                    .with_column(AxisSpec::from_entry_keys(["period"]))
                    .with_value(ValueSpec::new(["n"])),
            );
        let solution = json!({
            "theatres": [{"period": 1, "n": 5}, {"period": 2, "n": 6}],
            "beds": [{"period": 2, "n": 30}, {"period": 3, "n": 31}]
        });
        assert!(MatrixMapper.validate(&mapping));
        let table = MatrixMapper.produce_rows(&mapping, &solution).unwrap();
        assert_eq!(table.to_csv(), "Theatres,1,2,3\nTheatres,5,6,\nBeds,,30,31");
    }

    #[test]
    fn composite_row_keys_fill_identity_columns() {
        let mapping = OutputMapping::new("m.csv", MappingKind::Matrix).with_source(
            MappingSource::new("s", AxisSpec::from_entry_keys(["unit", "type"]))
                .with_column(AxisSpec::from_entry_keys(["p"]))
                .with_value(ValueSpec::new(["v"])),
        );
        let solution = json!({"s": [
            {"unit": "A", "type": "x", "p": 1, "v": 1.5},
            {"unit": "A", "type": "y", "p": 1, "v": 2}
        ]});
        let table = MatrixMapper.produce_rows(&mapping, &solution).unwrap();
        assert_eq!(table.to_csv(), "Item,,1\nA,x,1.5\nA,y,2");
    }

    #[test]
    fn empty_column_entry_keys_give_no_columns() {
        let mapping = OutputMapping::new("m.csv", MappingKind::Matrix).with_source(
            MappingSource::new("s", AxisSpec::from_labels(["label"]))
                .with_column(AxisSpec::new(None, Some(vec![]))),
        );
        let table = MatrixMapper
            .produce_rows(&mapping, &json!({"s": [{"column": "1"}]}))
            .unwrap();
        assert_eq!(table.header(), &["label".to_string()]);
        assert_eq!(table.rows(), &[vec![Some("label".to_string())]]);
    }

    #[test]
    fn missing_solution_key_fails() {
        assert!(MatrixMapper
            .produce_rows(&sessions_mapping(), &json!({"other": []}))
            .is_err());
    }

    #[test]
    fn validation_requires_csv_and_columns() {
        assert!(MatrixMapper.validate(&sessions_mapping()));

        let mut wrong_ext = sessions_mapping();
        wrong_ext.file_name = "sessions.json".into();
        assert!(!MatrixMapper.validate(&wrong_ext));

        let mut no_column = sessions_mapping();
        no_column.sources[0].column = None;
        assert!(!MatrixMapper.validate(&no_column));
    }

    #[test]
    fn validation_rejects_mismatched_sources() {
        let mapping = sessions_mapping().with_source(
            MappingSource::new("other", AxisSpec::from_entry_keys(["unit", "type"]))
                .with_column(AxisSpec::from_entry_keys(["week"])),
        );
        let report = MatrixMapper.check(&mapping);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("row mapping size 2")));
    }
}
