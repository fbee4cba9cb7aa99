//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::setup::{build_runner, runtime_config};

/// Execute the `run` command
///
/// The pipeline itself is blocking, so it runs on the blocking pool while
/// this task waits for either completion or a shutdown signal.
pub async fn run_pipeline(args: RunArgs) -> Result<()> {
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let config = runtime_config(&args.template)?;
    let runner = build_runner(&args.template)?;

    info!(
        template = %config.template_name,
        overrides = config.params.len(),
        credentials = config.credentials.len(),
        "Starting pipeline..."
    );

    let template = config.template_name.clone();
    let pipeline = tokio::task::spawn_blocking(move || runner.run_from_config(&config));

    tokio::select! {
        joined = pipeline => {
            let report = joined
                .context("Pipeline task panicked")?
                .with_context(|| format!("Pipeline '{template}' failed"))?;

            info!(sinks = report.len(), "Pipeline completed successfully");
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize telemetry report")?;
            println!("{json}");
        }
        _ = shutdown_signal() => {
            // The blocking pipeline thread cannot be cancelled; leaving main
            // normally would wait for it.
            warn!("Received shutdown signal, abandoning pipeline");
            std::process::exit(130);
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
