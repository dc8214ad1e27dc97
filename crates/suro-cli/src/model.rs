//! Model file loading.
//!
//! A model file holds a [`Model`] as JSON or YAML, chosen by extension
//! (`.yaml`/`.yml` parse as YAML, anything else as JSON).

use std::path::Path;

use anyhow::{Context, Result};

use suro_core::Model;

/// Read and parse a model file.
pub fn load_model(path: &Path) -> Result<Model> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let model: Model = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML model {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON model {}", path.display()))?
    };
    tracing::info!(
        path = %path.display(),
        model_id = %model.id,
        mappings = model.output_mappings.len(),
        "loaded model"
    );
    Ok(model)
}
