//! # suro CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use suro_cli::store::{run_store, StoreArgs};
use suro_cli::validate::{run_validate, ValidateArgs};
use suro_results::ResultsConfig;

/// Result mapping engine CLI.
///
/// Validates the output mappings of optimization models and maps solver
/// solutions into CSV and JSON attachments.
#[derive(Parser, Debug)]
#[command(name = "suro", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check every output mapping of a model file.
    Validate(ValidateArgs),

    /// Map a solution file into attachments on disk.
    Store(StoreArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match ResultsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, "loaded configuration");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Store(args) => run_store(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
