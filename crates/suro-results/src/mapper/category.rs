//! # Category Mapper (`json-category`)
//!
//! Groups entries by their row key and emits one JSON object field per
//! distinct category, in first-occurrence order. Each category holds the
//! value fields of the first entry in that category.
//!
//! ```json
//! { "ortho": { "sessions": 4, "cost": 1.5 }, "cardio": { "sessions": 2 } }
//! ```

use serde_json::{Map, Value};

use suro_core::{ArtifactFormat, ComplexKey, OutputMapping};

use crate::error::MapperResult;
use crate::extract::{resolve_key, source_entries};
use crate::validation::{check_axes, check_basics, warn_unused, ValidationReport};

use super::DocumentMapper;

/// Groups entries into a JSON object keyed by category.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryMapper;

impl DocumentMapper for CategoryMapper {
    fn name(&self) -> &str {
        "json-category"
    }

    fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        let mut report = check_basics(mapping, Some(ArtifactFormat::Json));
        report.merge(check_axes(mapping, false));
        for source in &mapping.sources {
            if source.value_keys().is_empty() {
                report.add_error(format!(
                    "source {:?} declares no value keys",
                    source.solution_key
                ));
            }
            if source.column.is_some() {
                warn_unused(&mut report, &source.solution_key, "column");
            }
        }
        report
    }

    fn produce_document(&self, mapping: &OutputMapping, solution: &Value) -> MapperResult<Value> {
        let mut document = Map::new();
        for source in &mapping.sources {
            let entries = source_entries(solution, &source.solution_key)?;
            for entry in entries {
                let category = if source.row.has_entry_keys() {
                    resolve_key(entry, source.row.entry_keys())
                } else {
                    ComplexKey::new(source.row.labels().iter().cloned())
                };
                let name = category.to_string();
                if document.contains_key(&name) {
                    continue;
                }
                let fields: Map<String, Value> = source
                    .value_keys()
                    .iter()
                    .filter_map(|k| entry.get(k).map(|v| (k.clone(), v.clone())))
                    .collect();
                document.insert(name, Value::Object(fields));
            }
        }
        Ok(Value::Object(document))
    }
}
