//! # Validate Subcommand
//!
//! Checks every output mapping of a model file against the mapper it
//! resolves to and prints one line per mapping.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use suro_core::Model;
use suro_results::{MapperRegistry, ResultsConfig, ValidationReport};

use crate::model::load_model;

/// Arguments for the `suro validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Model file (JSON or YAML).
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every mapping is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &ResultsConfig) -> Result<u8> {
    let registry = crate::build_registry(config)?;
    let model = load_model(&args.model)?;
    let failed = validate_model(&model, &registry);

    println!(
        "Mappings: {}/{} valid",
        model.output_mappings.len() - failed,
        model.output_mappings.len()
    );
    Ok(if failed > 0 { 1 } else { 0 })
}

/// Print a line per mapping and return the number of invalid mappings.
pub fn validate_model(model: &Model, registry: &MapperRegistry) -> usize {
    let mut failed = 0usize;
    for mapping in &model.output_mappings {
        let report = match registry.resolve(mapping) {
            Ok(mapper) => mapper.check(mapping),
            Err(e) => ValidationReport::fail(vec![e.to_string()]),
        };
        for warning in &report.warnings {
            println!("  WARN: {}: {warning}", mapping.file_name);
        }
        if report.is_valid {
            println!("  OK:   {} ({})", mapping.file_name, mapping.kind);
        } else {
            failed += 1;
            println!(
                "  FAIL: {} ({}): {}",
                mapping.file_name,
                mapping.kind,
                report.errors.join("; ")
            );
        }
    }
    failed
}
