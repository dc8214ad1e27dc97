//! # Mapping Validation
//!
//! Every mapper decides whether it can interpret an [`OutputMapping`] before
//! it is run. The checks here are the rules several mappers share; each
//! mapper combines them with its own completeness rules into one
//! [`ValidationReport`].
//!
//! Validation is a pure function of the mapping: running it twice gives the
//! same report, and failing it never raises. The orchestrator logs the
//! report and skips the mapping.

use serde::{Deserialize, Serialize};

use suro_core::{ArtifactFormat, AxisSpec, OutputMapping};

use crate::extract::RowMode;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Findings of one mapper about one output mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the mapper can interpret the mapping.
    pub is_valid: bool,
    /// Reasons the mapping was rejected.
    pub errors: Vec<String>,
    /// Non-fatal findings, such as specs the mapper ignores.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A report with no findings: the mapping can be run.
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A rejecting report carrying these reasons.
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Record a reason the mapping cannot be run.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Record a field the mapper will ignore. The mapping stays runnable.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Fold the findings of another rule into this report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Log every finding against the mapping and return validity.
    pub fn accept(&self, mapper: &str, file_name: &str) -> bool {
        for warning in &self.warnings {
            tracing::warn!(mapper, file_name, "{warning}");
        }
        for error in &self.errors {
            tracing::error!(mapper, file_name, "{error}");
        }
        self.is_valid
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::ok()
    }
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// File name, extension, and source presence.
///
/// The file name must be non-empty and, when `format` is given, end with its
/// extension. At least one source must be declared and every source must
/// name a solution key.
pub fn check_basics(mapping: &OutputMapping, format: Option<ArtifactFormat>) -> ValidationReport {
    let mut report = ValidationReport::ok();
    if mapping.file_name.is_empty() {
        report.add_error("output mapping has no file name".to_string());
    } else if let Some(format) = format {
        if !mapping.file_name.to_lowercase().ends_with(format.extension()) {
            report.add_error(format!(
                "file name {:?} is not compatible with {format} output",
                mapping.file_name
            ));
        }
    }
    if mapping.sources.is_empty() {
        report.add_error("output mapping declares no source".to_string());
    }
    for (index, source) in mapping.sources.iter().enumerate() {
        if source.solution_key.is_empty() {
            report.add_error(format!("source {index} has no solution key"));
        }
    }
    report
}

/// Every source's row axis is well-formed and, when `require_column`, so is
/// its column axis.
pub fn check_axes(mapping: &OutputMapping, require_column: bool) -> ValidationReport {
    let mut report = ValidationReport::ok();
    for source in &mapping.sources {
        if !source.row.is_well_formed() {
            report.add_error(format!(
                "source {:?} has no row labels or entry keys",
                source.solution_key
            ));
        }
        if require_column && !source.column.as_ref().is_some_and(AxisSpec::is_well_formed) {
            report.add_error(format!(
                "source {:?} has no column labels or entry keys",
                source.solution_key
            ));
        }
    }
    report
}

/// The identity shape of a row axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// Rows are identified by this many entry keys.
    Keys(usize),
    /// Rows are identified by this many literal labels.
    Labels(usize),
    /// The axis declares nothing.
    Empty,
}

impl RowShape {
    /// Shape of a row axis, following [`RowMode`](crate::extract::RowMode):
    /// a single label names the row even when entry keys are present.
    pub fn of(row: &AxisSpec) -> Self {
        match RowMode::of(row) {
            RowMode::Single(_) => Self::Labels(1),
            RowMode::Keyed(keys) => Self::Keys(keys.len()),
            RowMode::Literal(labels) => Self::Labels(labels.len()),
            RowMode::Absent => Self::Empty,
        }
    }
}

impl std::fmt::Display for RowShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keys(n) => write!(f, "{n} entry key(s)"),
            Self::Labels(n) => write!(f, "{n} label(s)"),
            Self::Empty => write!(f, "no identity"),
        }
    }
}

/// With several sources, every row axis has the shape of the first.
pub fn check_row_shapes(mapping: &OutputMapping) -> ValidationReport {
    let mut report = ValidationReport::ok();
    let mut sources = mapping.sources.iter();
    let Some(first) = sources.next() else {
        return report;
    };
    let expected = RowShape::of(&first.row);
    for source in sources {
        let shape = RowShape::of(&source.row);
        if shape != expected {
            report.add_error(format!(
                "source {:?} identifies rows by {shape}, expected {expected}",
                source.solution_key
            ));
        }
    }
    report
}

/// With several sources, every column axis declares as many labels or entry
/// keys as the first.
pub fn check_column_cardinality(mapping: &OutputMapping) -> ValidationReport {
    let mut report = ValidationReport::ok();
    let cardinality = |s: &suro_core::MappingSource| {
        s.column.as_ref().map(AxisSpec::cardinality).unwrap_or(0)
    };
    let mut sources = mapping.sources.iter();
    let Some(first) = sources.next() else {
        return report;
    };
    let expected = cardinality(first);
    for source in sources {
        let actual = cardinality(source);
        if actual != expected {
            report.add_error(format!(
                "source {:?} has column mapping size {actual}, expected {expected}",
                source.solution_key
            ));
        }
    }
    report
}

/// Warn about a spec the mapper does not read.
pub fn warn_unused(report: &mut ValidationReport, solution_key: &str, spec: &str) {
    report.add_warning(format!(
        "source {solution_key:?} specifies an unnecessary {spec} mapping"
    ));
}

#[cfg(test)]
mod tests {
    use suro_core::{MappingKind, MappingSource};

    use super::*;

    fn mapping(file: &str, sources: Vec<MappingSource>) -> OutputMapping {
        let mut m = OutputMapping::new(file, MappingKind::Matrix);
        m.sources = sources;
        m
    }

    #[test]
    fn basics_reject_empty_file_name() {
        let m = mapping("", vec![MappingSource::new("s", AxisSpec::default())]);
        let report = check_basics(&m, Some(ArtifactFormat::Csv));
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn basics_reject_wrong_extension() {
        let m = mapping("out.json", vec![MappingSource::new("s", AxisSpec::default())]);
        assert!(!check_basics(&m, Some(ArtifactFormat::Csv)).is_valid);
        assert!(check_basics(&m, Some(ArtifactFormat::Json)).is_valid);
        assert!(check_basics(&m, None).is_valid);
    }

    #[test]
    fn basics_accept_upper_case_extension() {
        let m = mapping("OUT.CSV", vec![MappingSource::new("s", AxisSpec::default())]);
        assert!(check_basics(&m, Some(ArtifactFormat::Csv)).is_valid);
    }

    #[test]
    fn basics_require_sources_with_keys() {
        assert!(!check_basics(&mapping("a.csv", vec![]), Some(ArtifactFormat::Csv)).is_valid);
        let m = mapping("a.csv", vec![MappingSource::new("", AxisSpec::default())]);
        assert!(!check_basics(&m, Some(ArtifactFormat::Csv)).is_valid);
    }

    #[test]
    fn axes_require_column_when_asked() {
        let m = mapping("a.csv", vec![MappingSource::new("s", AxisSpec::from_labels(["x"]))]);
        assert!(check_axes(&m, false).is_valid);
        assert!(!check_axes(&m, true).is_valid);
    }

    #[test]
    fn row_shapes_must_agree() {
        let m = mapping(
            "a.csv",
            vec![
                MappingSource::new("a", AxisSpec::from_entry_keys(["x", "y"])),
                MappingSource::new("b", AxisSpec::from_entry_keys(["p", "q"])),
            ],
        );
        assert!(check_row_shapes(&m).is_valid);

        let m = mapping(
            "a.csv",
            vec![
                MappingSource::new("a", AxisSpec::from_entry_keys(["x", "y"])),
                MappingSource::new("b", AxisSpec::from_labels(["p", "q"])),
            ],
        );
        let report = check_row_shapes(&m);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("2 label(s)"));
    }

    #[test]
    fn merge_propagates_failure_and_warnings() {
        let mut report = ValidationReport::ok();
        let mut other = ValidationReport::fail(vec!["bad".into()]);
        other.add_warning("meh".into());
        report.merge(other);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["bad"]);
        assert_eq!(report.warnings, vec!["meh"]);
    }
}
