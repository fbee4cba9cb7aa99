//! `render` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RenderArgs;
use crate::setup::{build_runner, runtime_config};

/// Execute the `render` command
pub fn run_render(args: &RenderArgs) -> Result<()> {
    let config = runtime_config(&args.template)?;
    let runner = build_runner(&args.template)?;

    info!(template = %config.template_name, "Rendering template");
    let compiled = runner
        .render_config(&config)
        .with_context(|| format!("Failed to render template '{}'", config.template_name))?;

    print!("{compiled}");
    Ok(())
}
