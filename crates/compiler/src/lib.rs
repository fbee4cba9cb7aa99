//! # Compiler
//!
//! Builds runnable pipelines from template definitions.
//!
//! Responsibilities:
//! - Map type tags to adapter constructors (`PluginRegistry`)
//! - Merge template parameters with runtime overrides and placeholders
//! - Construct sinks and sources, attach telemetry, wire sources to sinks
//!
//! Compilation performs no adapter I/O; `connect` and `run` belong to the
//! runner.

mod compiled;
mod compiler;
pub mod error;
pub mod merge;
mod registry;

pub use compiled::CompiledTemplate;
pub use compiler::{TelemetryFactory, TemplateCompiler};
pub use contracts::{RuntimeConfig, TemplateDefinition};
pub use error::{CompileError, Result};
pub use registry::{PluginRegistry, SinkConstructor, SourceConstructor};
