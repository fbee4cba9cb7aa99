//! # pipectl
//!
//! Command-line entry point.
//!
//! Provides:
//! - template resolution from a directory or a git repository
//! - compile-only rendering and validation
//! - pipeline execution with graceful shutdown

mod cli;
mod commands;
mod error;
mod setup;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_pipeline, run_render, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "pipectl starting");

    let result = match cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Render(args) => run_render(&args),
        Commands::Validate(args) => run_validate(&args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Logs go to stderr so command output on stdout stays machine readable
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: log_level(cli.quiet, cli.verbose).to_string(),
    })
}

fn log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
