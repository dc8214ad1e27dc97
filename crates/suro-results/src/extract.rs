//! # Extraction Primitives
//!
//! Shared building blocks for every tabular mapper: reading a source's entry
//! array out of the solution, rendering scalars as cell text, resolving
//! composite keys, enumerating the column axis, assembling the row-identity
//! prefix, and matching entries against (row, column) slots.
//!
//! ## Cells
//!
//! A cell is `Option<String>`. `None` means no entry matched the slot and is
//! written as empty text in CSV; `Some("")` means an entry matched but had no
//! content to contribute.
//!
//! ## Row Modes
//!
//! The row axis of a source selects one of four [`RowMode`]s:
//!
//! | row spec                       | mode                    | rows produced                  |
//! |--------------------------------|-------------------------|--------------------------------|
//! | exactly one label              | [`RowMode::Single`]     | one row named by the label     |
//! | entry keys (and not one label) | [`RowMode::Keyed`]      | one row per distinct key       |
//! | several labels, no entry keys  | [`RowMode::Literal`]    | one row per label              |
//! | nothing usable                 | [`RowMode::Absent`]     | none                           |

use indexmap::IndexMap;
use serde_json::Value;

use suro_core::{AxisSpec, ComplexKey, MappingSource};

use crate::error::{MapperResult, ResultError};

/// Identity header emitted for keyed rows that declare no labels.
pub const ITEM_HEADER: &str = "Item";

// ---------------------------------------------------------------------------
// Scalars and keys
// ---------------------------------------------------------------------------

/// Render a JSON value as cell text.
///
/// Strings render as themselves, integers in decimal. A float within 0.001
/// of an integer renders as that integer, any other float in its shortest
/// decimal form. Booleans render as empty text. `null`, arrays and objects
/// have no text.
pub fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(render_float)
            }
        }
        Value::Bool(_) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn render_float(v: f64) -> String {
    let rounded = v.round();
    let in_range = rounded >= i64::MIN as f64 && rounded < i64::MAX as f64;
    if in_range && (rounded - v).abs() < 0.001 {
        format!("{}", rounded as i64)
    } else {
        format!("{v}")
    }
}

/// Text of `entry[field]`, if the field exists and has text.
pub fn field_value(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(string_value)
}

/// Text of `entry[field]`, empty when absent.
pub fn field_text(entry: &Value, field: &str) -> String {
    field_value(entry, field).unwrap_or_default()
}

/// Read each field of `entry` in order and join them into a key.
/// Absent fields contribute empty components.
pub fn resolve_key(entry: &Value, fields: &[String]) -> ComplexKey {
    fields.iter().map(|f| field_text(entry, f)).collect()
}

/// Text contributed by a matching entry: the value fields when declared,
/// otherwise the row's own key fields, otherwise empty text. Multiple fields
/// are joined by a single space.
pub fn cell_text(entry: &Value, source: &MappingSource) -> String {
    let fields = if !source.value_keys().is_empty() {
        source.value_keys()
    } else {
        source.row.entry_keys()
    };
    fields
        .iter()
        .map(|f| field_text(entry, f))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The entry array a source reads from.
///
/// # Errors
///
/// [`ResultError::MissingSource`] when the solution has no such field,
/// [`ResultError::NotAnArray`] when the field is not an array.
pub fn source_entries<'a>(solution: &'a Value, solution_key: &str) -> MapperResult<&'a [Value]> {
    match solution.get(solution_key) {
        None => Err(ResultError::MissingSource {
            solution_key: solution_key.to_string(),
        }),
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(ResultError::NotAnArray {
            solution_key: solution_key.to_string(),
        }),
    }
}

/// Distinct values of `fields` across `entries`, in first-occurrence order.
pub fn distinct_keys(entries: &[Value], fields: &[String]) -> Vec<ComplexKey> {
    let mut seen: IndexMap<ComplexKey, ()> = IndexMap::new();
    for entry in entries {
        seen.entry(resolve_key(entry, fields)).or_insert(());
    }
    seen.into_keys().collect()
}

// ---------------------------------------------------------------------------
// Row axis
// ---------------------------------------------------------------------------

/// How a source's row axis turns entries into body rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode<'a> {
    /// One row, named by the single label.
    Single(&'a str),
    /// One row per distinct key read from these entry fields.
    Keyed(&'a [String]),
    /// One row per literal label.
    Literal(&'a [String]),
    /// The row axis is not usable; no rows.
    Absent,
}

impl<'a> RowMode<'a> {
    /// Select the mode for a row axis.
    pub fn of(row: &'a AxisSpec) -> Self {
        match (row.labels(), row.entry_keys()) {
            ([label], _) => Self::Single(label),
            (_, keys) if !keys.is_empty() => Self::Keyed(keys),
            (labels, _) if !labels.is_empty() => Self::Literal(labels),
            _ => Self::Absent,
        }
    }
}

/// Header cells identifying the rows of one source.
///
/// A single label is emitted as itself. Several labels are emitted verbatim.
/// Entry keys without labels are announced by [`ITEM_HEADER`]. Composite
/// keys get empty headers for their remaining components.
pub fn row_prefix(row: &AxisSpec) -> Vec<String> {
    let labels = row.labels();
    let key_width = row.entry_keys().len();
    if labels.len() == 1 {
        return labels.to_vec();
    }
    let mut prefix: Vec<String> = if !labels.is_empty() {
        labels.to_vec()
    } else if key_width > 0 {
        vec![ITEM_HEADER.to_string()]
    } else {
        Vec::new()
    };
    if prefix.len() < key_width {
        prefix.resize(key_width, String::new());
    }
    prefix
}

/// The row-identity prefix of a mapping: that of the first source which
/// yields one.
pub fn header_prefix(sources: &[MappingSource]) -> Vec<String> {
    sources
        .iter()
        .map(|s| row_prefix(&s.row))
        .find(|p| !p.is_empty())
        .unwrap_or_default()
}

/// Identity cells for a body row, padded with empty text or truncated to
/// `width`.
pub fn fit_identity<I, S>(parts: I, width: usize) -> Vec<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cells: Vec<Option<String>> =
        parts.into_iter().take(width).map(|p| Some(p.into())).collect();
    cells.resize(width, Some(String::new()));
    cells
}

// ---------------------------------------------------------------------------
// Column axis
// ---------------------------------------------------------------------------

/// The ordered, distinct columns of a produced table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAxis {
    columns: IndexMap<ComplexKey, String>,
}

impl ColumnAxis {
    /// Columns named by raw labels. Each label is both key and header.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut axis = Self::default();
        for label in labels {
            let label = label.into();
            axis.insert(ComplexKey::single(label.clone()), label);
        }
        axis
    }

    /// Enumerate the columns declared or discovered by every source, in
    /// declaration order then entry order. A source whose column axis has
    /// entry keys contributes the distinct keys found in its entries; a
    /// labels-only column axis contributes its labels. When a column axis
    /// has exactly one label and entry keys, the label prefixes the header.
    ///
    /// # Errors
    ///
    /// Fails when a source with entry-keyed columns cannot be read from the
    /// solution.
    pub fn from_sources(sources: &[MappingSource], solution: &Value) -> MapperResult<Self> {
        let mut axis = Self::default();
        for source in sources {
            let Some(column) = source.column.as_ref() else {
                continue;
            };
            if column.has_entry_keys() {
                let entries = source_entries(solution, &source.solution_key)?;
                let prefix = match column.labels() {
                    [label] => Some(label.as_str()),
                    _ => None,
                };
                for key in distinct_keys(entries, column.entry_keys()) {
                    let header = match prefix {
                        Some(p) => format!("{p} {key}"),
                        None => key.to_string(),
                    };
                    axis.insert(key, header);
                }
            } else {
                for label in column.labels() {
                    axis.insert(ComplexKey::single(label.clone()), label.clone());
                }
            }
        }
        Ok(axis)
    }

    fn insert(&mut self, key: ComplexKey, header: String) {
        self.columns.entry(key).or_insert(header);
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column headers in order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Column keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &ComplexKey> {
        self.columns.keys()
    }

    /// Position of a column key.
    pub fn index_of(&self, key: &ComplexKey) -> Option<usize> {
        self.columns.get_index_of(key)
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Every value matched into each (row, column) slot of one source, in entry
/// order. Rows appear in first-occurrence order; each row holds one list per
/// column.
pub type SlotMatches = IndexMap<ComplexKey, Vec<Vec<String>>>;

/// Match the entries of one source against `columns`.
///
/// Single-label and literal-label rows always appear, even when nothing
/// matches. Keyed rows appear once per distinct key, including keys whose
/// entries matched no column. An entry's column key is read with the
/// source's own column axis; absent fields read as empty text.
pub fn collect_matches(source: &MappingSource, entries: &[Value], columns: &ColumnAxis) -> SlotMatches {
    let mut rows = SlotMatches::new();
    let column_fields = source
        .column
        .as_ref()
        .map(|c| c.entry_keys())
        .unwrap_or(&[]);
    let empty_row = || vec![Vec::new(); columns.len()];

    let row_fields: Option<&[String]> = match RowMode::of(&source.row) {
        RowMode::Absent => return rows,
        RowMode::Keyed(fields) => Some(fields),
        RowMode::Single(label) => {
            rows.insert(ComplexKey::single(label), empty_row());
            None
        }
        RowMode::Literal(labels) => {
            for label in labels {
                rows.entry(ComplexKey::single(label.clone()))
                    .or_insert_with(empty_row);
            }
            None
        }
    };

    for entry in entries {
        let slots: Vec<&mut Vec<Vec<String>>> = match row_fields {
            Some(fields) => vec![rows
                .entry(resolve_key(entry, fields))
                .or_insert_with(empty_row)],
            None => rows.values_mut().collect(),
        };
        let Some(index) = columns.index_of(&resolve_key(entry, column_fields)) else {
            continue;
        };
        let text = cell_text(entry, source);
        for row in slots {
            row[index].push(text.clone());
        }
    }
    rows
}

/// Collapse each slot to the text of its first match, in entry order.
/// Empty slots are absent.
pub fn first_matches(slots: Vec<Vec<String>>) -> Vec<Option<String>> {
    slots
        .into_iter()
        .map(|slot| slot.into_iter().next())
        .collect()
}
