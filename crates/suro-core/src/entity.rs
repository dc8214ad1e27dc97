//! # Entities
//!
//! The persisted records the result pipeline reads and writes: a [`Model`]
//! owning its output mappings, a [`Run`] referencing the model it executed,
//! and the [`Attachment`]s stored on a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{ModelId, RunId};
use crate::mapping::OutputMapping;

/// An optimization model and the artifacts its solutions are mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Model identifier.
    #[serde(default)]
    pub id: ModelId,
    /// Human-readable name.
    #[serde(default)]
    pub label: String,
    /// Output mappings in processing order.
    #[serde(default)]
    pub output_mappings: Vec<OutputMapping>,
}

impl Model {
    /// A model with a fresh identifier and no mappings.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: ModelId::new(),
            label: label.into(),
            output_mappings: Vec::new(),
        }
    }

    /// Append an output mapping.
    pub fn with_mapping(mut self, mapping: OutputMapping) -> Self {
        self.output_mappings.push(mapping);
        self
    }
}

/// One execution of the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Run identifier.
    pub id: RunId,
    /// The model this run executed, when known.
    pub model_id: Option<ModelId>,
    /// Human-readable name.
    #[serde(default)]
    pub label: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Run {
    /// A new run of `model`.
    pub fn new(model_id: ModelId) -> Self {
        Self {
            id: RunId::new(),
            model_id: Some(model_id),
            label: String::new(),
            created_at: Utc::now(),
        }
    }

    /// A run that references no model.
    pub fn detached() -> Self {
        Self {
            id: RunId::new(),
            model_id: None,
            label: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: RunId) -> Self {
        self.id = id;
        self
    }
}

/// A named binary blob stored on a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name, unique per run.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
    /// When the attachment was written.
    pub stored_at: DateTime<Utc>,
}

impl Attachment {
    /// Content interpreted as UTF-8, if valid.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingKind;

    #[test]
    fn model_parses_with_defaults() {
        let model: Model = serde_json::from_str(
            r#"{"label":"elective","outputMappings":[{"fileName":"a.csv","mappingType":"complex"}]}"#,
        )
        .unwrap();
        assert_eq!(model.label, "elective");
        assert_eq!(model.output_mappings.len(), 1);
        assert_eq!(model.output_mappings[0].kind, MappingKind::Matrix);
    }

    #[test]
    fn run_references_model() {
        let model = Model::new("m");
        let run = Run::new(model.id);
        assert_eq!(run.model_id, Some(model.id));
        assert_eq!(Run::detached().model_id, None);
    }

    #[test]
    fn attachment_text_view() {
        let attachment = Attachment {
            name: "a.csv".into(),
            content_type: "text/csv".into(),
            bytes: b"x,y".to_vec(),
            stored_at: Utc::now(),
        };
        assert_eq!(attachment.as_text(), Some("x,y"));
    }
}
