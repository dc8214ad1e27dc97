//! # Store Subcommand
//!
//! Runs a model's output mappings against a solution file and writes the
//! attachments to `<results-dir>/<run-id>/<file-name>`. The orchestrator's
//! response is printed as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use suro_core::{Run, RunId};
use suro_results::{ProcessResponse, ResultOrchestrator, ResultsConfig};

use crate::dir_store::DirectoryStore;
use crate::model::load_model;

/// Arguments for the `suro store` subcommand.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Model file (JSON or YAML).
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Solution JSON file produced by the solver.
    #[arg(value_name = "SOLUTION")]
    pub solution: PathBuf,

    /// Run identifier (random when omitted).
    #[arg(long)]
    pub run_id: Option<RunId>,

    /// Root directory for attachments (overrides SURO_RESULTS_DIR).
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

/// Execute the store subcommand.
///
/// Returns exit code: 0 when every mapping was stored, 1 otherwise.
pub fn run_store(args: &StoreArgs, config: &ResultsConfig) -> Result<u8> {
    let (response, _) = store_solution(args, config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("failed to render response")?
    );
    Ok(if response.is_clean() { 0 } else { 1 })
}

/// Run the orchestrator and return its response and the run's directory.
pub fn store_solution(args: &StoreArgs, config: &ResultsConfig) -> Result<(ProcessResponse, PathBuf)> {
    let registry = crate::build_registry(config)?;
    let model = load_model(&args.model)?;
    let bytes = std::fs::read(&args.solution)
        .with_context(|| format!("failed to read solution file {}", args.solution.display()))?;

    let results_dir = args
        .results_dir
        .clone()
        .unwrap_or_else(|| config.results_dir.clone());
    let run = Run::new(model.id).with_id(args.run_id.unwrap_or_default());
    let store = DirectoryStore::new(results_dir);
    let run_dir = store.run_dir(&run.id);
    store.insert_model(model);
    store.insert_run(run.clone());

    tracing::info!(run_id = %run.id, dir = %run_dir.display(), "storing solution results");
    let orchestrator = ResultOrchestrator::new(store, registry);
    let response = orchestrator.store_results_bytes(Some(&run), Some(&bytes));
    Ok((response, run_dir))
}
