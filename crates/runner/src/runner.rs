//! PipeRunner - resolves, compiles and executes templates

use std::time::Instant;

use compiler::{CompiledTemplate, PluginRegistry, TemplateCompiler};
use contracts::{RuntimeConfig, Source, TelemetryReport};
use metrics::{counter, histogram};
use template_registry::TemplateRegistry;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::state::SourceState;

/// Pipeline runner
///
/// Sources execute one at a time in declaration order. Each source connects,
/// connects its sinks, then runs to completion before the next one starts.
pub struct PipeRunner<R: TemplateRegistry> {
    registry: R,
    compiler: TemplateCompiler,
}

impl<R: TemplateRegistry> PipeRunner<R> {
    pub fn new(registry: R, plugins: PluginRegistry) -> Self {
        Self::with_compiler(registry, TemplateCompiler::new(plugins))
    }

    pub fn with_compiler(registry: R, compiler: TemplateCompiler) -> Self {
        Self { registry, compiler }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn compiler(&self) -> &TemplateCompiler {
        &self.compiler
    }

    /// Resolve and compile the configured template without running it
    #[instrument(
        name = "pipe_runner_render",
        skip(self, config),
        fields(template = %config.template_name)
    )]
    pub fn render_config(&self, config: &RuntimeConfig) -> Result<CompiledTemplate> {
        let definition = self.registry.get_template_by_name(&config.template_name)?;
        let compiled = self.compiler.compile(&definition, config)?;
        Ok(compiled)
    }

    /// Resolve, compile and run the configured template
    pub fn run_from_config(&self, config: &RuntimeConfig) -> Result<TelemetryReport> {
        let compiled = self.render_config(config)?;
        self.run(compiled)
    }

    /// Run a compiled template and collect every sink's telemetry
    ///
    /// The first failing source halts the pipeline; no telemetry is returned
    /// in that case.
    #[instrument(
        name = "pipe_runner_run",
        skip(self, compiled),
        fields(
            template = %compiled.name,
            sources = compiled.sources.len(),
            sinks = compiled.sinks.len()
        )
    )]
    pub fn run(&self, mut compiled: CompiledTemplate) -> Result<TelemetryReport> {
        let started = Instant::now();

        for (name, source) in compiled.sources.iter_mut() {
            if let Err(e) = run_source(name, source.as_mut()) {
                error!(source = %name, error = %e, "pipeline halted");
                counter!("pipeline_runs_total", "status" => "failure").increment(1);
                return Err(e);
            }
        }

        let mut report = TelemetryReport::new();
        for (name, sink) in &compiled.sinks {
            match sink.lock().take_telemetry() {
                Some(telemetry) => {
                    report.insert(name.clone(), telemetry.dump());
                }
                None => warn!(sink = %name, "sink has no telemetry handle"),
            }
        }

        let elapsed = started.elapsed();
        counter!("pipeline_runs_total", "status" => "success").increment(1);
        histogram!("pipeline_run_duration_seconds").record(elapsed.as_secs_f64());
        info!(
            duration_secs = elapsed.as_secs_f64(),
            sinks_reported = report.len(),
            "pipeline completed"
        );
        Ok(report)
    }
}

/// Drive one source through its lifecycle
fn run_source(name: &str, source: &mut dyn Source) -> Result<()> {
    let mut state = SourceState::Created;
    let hints = source.base().hints;
    debug!(source = name, %state, processes = ?hints.processes, concurrency = ?hints.concurrency, "source ready");

    state.advance();
    if source.supports_connect() {
        match source.connect() {
            Ok(()) => debug!(source = name, %state, "source connected"),
            Err(e) if e.is_unimplemented() => {
                debug!(source = name, %state, "connect not implemented, skipping")
            }
            Err(e) => return Err(PipelineError::connect(name, e)),
        }
    }

    state.advance();
    source
        .connect_sinks()
        .map_err(|e| PipelineError::connect(name, e))?;
    debug!(
        source = name,
        %state,
        sinks = source.base().sink_count(),
        telemetry = ?source.base().telemetry_sinks(),
        "sinks connected"
    );

    state.advance();
    info!(source = name, %state, "running source");
    source.run().map_err(|e| PipelineError::run(name, e))?;

    state.advance();
    info!(source = name, %state, "source finished");
    Ok(())
}
