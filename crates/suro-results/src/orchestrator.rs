//! # Result Orchestrator
//!
//! Turns one solution into the attachments its model declares.
//!
//! ## Flow
//!
//! 1. Resolve the run's [`Model`](suro_core::Model). A missing run, an
//!    unresolvable model or a model without output mappings fails the whole
//!    call before anything is written.
//! 2. For each output mapping, in declared order: resolve the mapper (the
//!    built-in for its kind, or the registered custom mapper), validate,
//!    produce, serialize, and attach the bytes to the run under the
//!    mapping's file name.
//! 3. A mapping that fails at any step is logged and listed in the response
//!    message; the remaining mappings still run.
//!
//! The call completes with `succeeded = true` once every mapping has been
//! attempted. `message` is absent when nothing failed and otherwise lists
//! the failed file names as `[a.csv b.json]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use suro_core::{OutputMapping, Run, RunId};

use crate::error::{MapperResult, ResultError};
use crate::mapper::MapperRegistry;
use crate::store::ResultStore;

/// Outcome of one orchestrator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Whether the mapping loop ran to completion.
    pub succeeded: bool,
    /// Failure reason, or the bracketed list of skipped file names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProcessResponse {
    /// A call that stopped before running any mapping.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: Some(message.into()),
        }
    }

    /// A call that attempted every mapping.
    pub fn completed(skipped: &[String]) -> Self {
        Self {
            succeeded: true,
            message: (!skipped.is_empty()).then(|| format!("[{}]", skipped.join(" "))),
        }
    }

    /// Succeeded with nothing skipped.
    pub fn is_clean(&self) -> bool {
        self.succeeded && self.message.is_none()
    }
}

/// Runs a model's output mappings against solutions and persists the
/// results.
#[derive(Debug, Clone)]
pub struct ResultOrchestrator<S> {
    store: S,
    registry: MapperRegistry,
}

impl<S: ResultStore> ResultOrchestrator<S> {
    /// Create an orchestrator over `store`, resolving custom mappers
    /// through `registry`.
    pub fn new(store: S, registry: MapperRegistry) -> Self {
        Self { store, registry }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The custom mapper registry.
    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    /// Map `solution` into the attachments declared by the run's model.
    pub fn store_results(&self, run: Option<&Run>, solution: &Value) -> ProcessResponse {
        let Some(run) = run else {
            tracing::error!("cannot store results without a run");
            return ProcessResponse::failed("no run given");
        };

        let Some(model_id) = run.model_id else {
            tracing::error!(run_id = %run.id, "run references no model");
            return ProcessResponse::failed(format!("run {} references no model", run.id));
        };
        let model = match self.store.get_model(&model_id) {
            Ok(Some(model)) => model,
            Ok(None) => {
                tracing::error!(run_id = %run.id, model_id = %model_id, "model not found");
                return ProcessResponse::failed(format!("model {model_id} not found"));
            }
            Err(e) => {
                tracing::error!(run_id = %run.id, model_id = %model_id, error = %e, "model lookup failed");
                return ProcessResponse::failed(format!("model {model_id} could not be loaded: {e}"));
            }
        };
        if model.output_mappings.is_empty() {
            tracing::warn!(run_id = %run.id, model_id = %model_id, "model declares no output mappings");
            return ProcessResponse::failed(format!("model {model_id} has no output mappings"));
        }

        tracing::info!(
            run_id = %run.id,
            model_id = %model_id,
            mappings = model.output_mappings.len(),
            "storing results"
        );

        let mut skipped = Vec::new();
        for mapping in &model.output_mappings {
            match self.run_mapping(run, mapping, solution) {
                Ok(Some(bytes)) => {
                    tracing::info!(run_id = %run.id, file_name = %mapping.file_name, bytes, "stored attachment");
                }
                Ok(None) => {
                    tracing::warn!(
                        run_id = %run.id,
                        file_name = %mapping.file_name,
                        mapping_type = %mapping.kind,
                        "invalid output mapping skipped"
                    );
                    skipped.push(mapping.file_name.clone());
                }
                Err(e) => {
                    tracing::error!(
                        run_id = %run.id,
                        file_name = %mapping.file_name,
                        mapping_type = %mapping.kind,
                        error = %e,
                        "output mapping failed"
                    );
                    skipped.push(mapping.file_name.clone());
                }
            }
        }
        ProcessResponse::completed(&skipped)
    }

    /// Parse `bytes` as the solution, then behave as [`store_results`].
    ///
    /// [`store_results`]: Self::store_results
    pub fn store_results_bytes(&self, run: Option<&Run>, bytes: Option<&[u8]>) -> ProcessResponse {
        let Some(bytes) = bytes else {
            tracing::error!("no solution stream given");
            return ProcessResponse::failed("no solution given");
        };
        match serde_json::from_slice::<Value>(bytes) {
            Ok(solution) => self.store_results(run, &solution),
            Err(e) => {
                tracing::error!(error = %e, "solution is not valid JSON");
                ProcessResponse::failed(format!("solution is not valid JSON: {e}"))
            }
        }
    }

    /// Look up the run by id, then behave as [`store_results`].
    ///
    /// [`store_results`]: Self::store_results
    pub fn store_results_for(&self, run_id: &RunId, solution: &Value) -> ProcessResponse {
        match self.store.get_run(run_id) {
            Ok(run) => self.store_results(run.as_ref(), solution),
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "run lookup failed");
                ProcessResponse::failed(format!("run {run_id} could not be loaded: {e}"))
            }
        }
    }

    /// Validate, produce and persist one mapping. `Ok(None)` when the
    /// mapping is invalid for its mapper, otherwise the stored byte count.
    fn run_mapping(&self, run: &Run, mapping: &OutputMapping, solution: &Value) -> MapperResult<Option<usize>> {
        let mapper = self.registry.resolve(mapping)?;
        if !mapper.validate(mapping) {
            return Ok(None);
        }
        if let Some(requested) = mapping.format() {
            if requested != mapper.format() {
                return Err(ResultError::UnsupportedOperation {
                    mapper: mapper.name().to_string(),
                    format: requested,
                    file_name: mapping.file_name.clone(),
                });
            }
        }

        let artifact = mapper.produce(mapping, solution)?;
        let bytes = artifact.to_bytes()?;
        let len = bytes.len();
        self.store.attach_as_bytes(
            &run.id,
            &mapping.file_name,
            artifact.format().content_type(),
            bytes,
        )?;
        Ok(Some(len))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use suro_core::{AxisSpec, MappingKind, MappingSource, Model, ValueSpec};

    use super::*;
    use crate::mapper::{DocumentMapper, Mapper};
    use crate::store::InMemoryStore;
    use crate::validation::ValidationReport;

    fn valid_mapping() -> OutputMapping {
        OutputMapping::new("sessions.csv", MappingKind::Matrix).with_source(
            MappingSource::new("sessions", AxisSpec::from_labels(["Sessions"]))
                .with_column(AxisSpec::from_entry_keys(["week"]))
                .with_value(ValueSpec::new(["n"])),
        )
    }

    fn setup(mappings: Vec<OutputMapping>) -> (ResultOrchestrator<InMemoryStore>, Run) {
        let store = InMemoryStore::new();
        let mut model = Model::new("elective");
        model.output_mappings = mappings;
        let run = Run::new(model.id);
        store.insert_model(model);
        store.insert_run(run.clone());
        (ResultOrchestrator::new(store, MapperRegistry::with_builtins()), run)
    }

    fn solution() -> Value {
        json!({"sessions": [{"week": 1, "n": 2}, {"week": 2, "n": 3}]})
    }

    #[test]
    fn completed_message_lists_skipped_names() {
        assert_eq!(ProcessResponse::completed(&[]).message, None);
        let response = ProcessResponse::completed(&["a.csv".into(), "b.json".into()]);
        assert!(response.succeeded);
        assert_eq!(response.message.as_deref(), Some("[a.csv b.json]"));
    }

    #[test]
    fn stores_valid_mapping() {
        let (orchestrator, run) = setup(vec![valid_mapping()]);
        let response = orchestrator.store_results(Some(&run), &solution());
        assert!(response.is_clean());
        let attachment = orchestrator.store().attachment(&run.id, "sessions.csv").unwrap();
        assert_eq!(attachment.as_text(), Some("Sessions,1,2\nSessions,2,3"));
        assert_eq!(attachment.content_type, "text/csv");
    }

    #[test]
    fn absent_run_fails() {
        let (orchestrator, _) = setup(vec![valid_mapping()]);
        let response = orchestrator.store_results(None, &solution());
        assert!(!response.succeeded);
    }

    #[test]
    fn unresolvable_model_fails_before_writing() {
        let (orchestrator, _) = setup(vec![valid_mapping()]);
        let stranger = Run::new(suro_core::ModelId::new());
        orchestrator.store().insert_run(stranger.clone());
        let response = orchestrator.store_results(Some(&stranger), &solution());
        assert!(!response.succeeded);
        assert!(orchestrator.store().attachments(&stranger.id).is_empty());

        let detached = Run::detached();
        assert!(!orchestrator.store_results(Some(&detached), &solution()).succeeded);
    }

    #[test]
    fn model_without_mappings_fails() {
        let (orchestrator, run) = setup(vec![]);
        assert!(!orchestrator.store_results(Some(&run), &solution()).succeeded);
    }

    #[test]
    fn missing_solution_key_is_listed() {
        let mut broken = valid_mapping();
        broken.file_name = "broken.csv".into();
        broken.sources[0].solution_key = "nowhere".into();
        let (orchestrator, run) = setup(vec![broken, valid_mapping()]);
        let response = orchestrator.store_results(Some(&run), &solution());
        assert!(response.succeeded);
        assert_eq!(response.message.as_deref(), Some("[broken.csv]"));
        assert!(orchestrator.store().attachment(&run.id, "sessions.csv").is_some());
    }

    struct Permissive;

    impl DocumentMapper for Permissive {
        fn name(&self) -> &str {
            "permissive"
        }

        fn check(&self, _mapping: &OutputMapping) -> ValidationReport {
            ValidationReport::ok()
        }

        fn produce_document(&self, _mapping: &OutputMapping, _solution: &Value) -> MapperResult<Value> {
            Ok(json!({}))
        }
    }

    #[test]
    fn format_mismatch_is_an_unsupported_operation() {
        let mut registry = MapperRegistry::new();
        registry.register("permissive", || Mapper::document(Permissive));
        let mapping = OutputMapping::new("doc.csv", MappingKind::Custom).with_custom_id("permissive");
        let store = InMemoryStore::new();
        let model = Model::new("m").with_mapping(mapping.clone());
        let run = Run::new(model.id);
        store.insert_model(model);
        store.insert_run(run.clone());
        let orchestrator = ResultOrchestrator::new(store, registry);

        assert!(matches!(
            orchestrator.run_mapping(&run, &mapping, &solution()),
            Err(ResultError::UnsupportedOperation { .. })
        ));
        let response = orchestrator.store_results(Some(&run), &solution());
        assert_eq!(response.message.as_deref(), Some("[doc.csv]"));
        assert!(orchestrator.store().attachments(&run.id).is_empty());
    }

    #[test]
    fn unknown_transformer_is_listed() {
        let mapping = OutputMapping::new("x.json", MappingKind::Custom).with_custom_id("nope");
        let (orchestrator, run) = setup(vec![mapping, valid_mapping()]);
        let response = orchestrator.store_results(Some(&run), &solution());
        assert!(response.succeeded);
        assert_eq!(response.message.as_deref(), Some("[x.json]"));
    }

    #[test]
    fn bytes_overload_parses_once() {
        let (orchestrator, run) = setup(vec![valid_mapping()]);
        let bytes = serde_json::to_vec(&solution()).unwrap();
        assert!(orchestrator.store_results_bytes(Some(&run), Some(&bytes)).is_clean());
        assert!(!orchestrator.store_results_bytes(Some(&run), None).succeeded);
        assert!(!orchestrator.store_results_bytes(Some(&run), Some(b"{nope")).succeeded);
    }

    #[test]
    fn lookup_by_run_id() {
        let (orchestrator, run) = setup(vec![valid_mapping()]);
        assert!(orchestrator.store_results_for(&run.id, &solution()).is_clean());
        assert!(!orchestrator.store_results_for(&RunId::new(), &solution()).succeeded);
    }
}
