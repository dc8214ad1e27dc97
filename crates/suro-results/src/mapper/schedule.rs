//! # Schedule Mapper (custom `schedule`)
//!
//! Restructures the solver's flat session allocation into a calendar
//! document keyed by week then day:
//!
//! ```json
//! {
//!   "1": {
//!     "Mon": [
//!       { "medicalUnitId": 4, "allocatedSessions": 2, "allocatedSessionsBase": 1,
//!         "treatedPatients": [ { "surgeryType": "hip", "isOverdue": false, "daysUntilOverdue": 12 } ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Entries are read from the `schedule` and `scheduleWithPatient` arrays, in
//! that order. The first entry for a (week, day, unit) creates the unit;
//! every entry carrying `treatedPatient.surgeryType` appends a patient.

use serde_json::{json, Map, Value};

use suro_core::{ArtifactFormat, OutputMapping};

use crate::error::MapperResult;
use crate::extract::field_value;
use crate::validation::{check_basics, ValidationReport};

use super::DocumentMapper;

/// Solution arrays read by the schedule mapper, in processing order.
pub const SCHEDULE_KEYS: [&str; 2] = ["schedule", "scheduleWithPatient"];

/// Builds the week/day/unit calendar document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleMapper;

impl ScheduleMapper {
    /// Registry identifier.
    pub const ID: &'static str = "schedule";
}

impl DocumentMapper for ScheduleMapper {
    fn name(&self) -> &str {
        Self::ID
    }

    fn check(&self, mapping: &OutputMapping) -> ValidationReport {
        check_basics(mapping, Some(ArtifactFormat::Json))
    }

    fn produce_document(&self, _mapping: &OutputMapping, solution: &Value) -> MapperResult<Value> {
        let mut weeks = Map::new();
        for key in SCHEDULE_KEYS {
            let Some(entries) = solution.get(key).and_then(Value::as_array) else {
                tracing::debug!(solution_key = key, "schedule array absent");
                continue;
            };
            for entry in entries {
                add_entry(&mut weeks, entry);
            }
        }
        Ok(Value::Object(weeks))
    }
}

fn add_entry(weeks: &mut Map<String, Value>, entry: &Value) {
    let (Some(unit_id), Some(week), Some(day)) = (
        entry.get("medicalUnitId").and_then(Value::as_i64),
        field_value(entry, "week"),
        field_value(entry, "day"),
    ) else {
        tracing::warn!(entry = %entry, "schedule entry lacks medicalUnitId, week or day; skipped");
        return;
    };

    let days = weeks
        .entry(week)
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(units) = days
        .as_object_mut()
        .map(|d| d.entry(day).or_insert_with(|| Value::Array(Vec::new())))
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    let position = units
        .iter()
        .position(|u| u.get("medicalUnitId").and_then(Value::as_i64) == Some(unit_id));
    let index = match position {
        Some(index) => index,
        None => {
            units.push(json!({
                "medicalUnitId": unit_id,
                "allocatedSessions": int_field(entry, "allocatedSessions"),
                "allocatedSessionsBase": int_field(entry, "allocatedSessionsBase"),
                "treatedPatients": [],
            }));
            units.len() - 1
        }
    };

    if let Some(patient) = treated_patient(entry) {
        if let Some(patients) = units[index]
            .get_mut("treatedPatients")
            .and_then(Value::as_array_mut)
        {
            patients.push(patient);
        }
    }
}

fn int_field(entry: &Value, field: &str) -> i64 {
    entry.get(field).and_then(Value::as_i64).unwrap_or(0)
}

fn treated_patient(entry: &Value) -> Option<Value> {
    let surgery_type = entry.get("treatedPatient.surgeryType")?;
    Some(json!({
        "surgeryType": surgery_type.as_str().unwrap_or_default(),
        "isOverdue": entry
            .get("treatedPatient.isOverdue")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        "daysUntilOverdue": int_field(entry, "treatedPatient.daysUntilOverdue"),
    }))
}
