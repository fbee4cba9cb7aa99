//! # Runner
//!
//! Executes compiled templates.
//!
//! `RuntimeConfig -> registry -> compiler -> per-source lifecycle -> TelemetryReport`
//!
//! Execution is synchronous and single threaded. `processes` and
//! `concurrency` hints are logged but never acted on here.

mod error;
mod runner;
mod state;

pub use compiler::{CompiledTemplate, PluginRegistry, TemplateCompiler};
pub use contracts::{RuntimeConfig, TelemetryReport};
pub use error::{PipelineError, Result};
pub use runner::PipeRunner;
pub use state::SourceState;
