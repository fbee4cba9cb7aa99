//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Flow
//! `RuntimeConfig` -> registry -> `TemplateDefinition` -> compiler -> sources/sinks
//! -> runner -> `TelemetryReport`

mod block;
mod error;
mod params;
mod runtime;
mod sink;
mod source;
mod telemetry;
mod template;

pub use block::*;
pub use error::*;
pub use params::*;
pub use runtime::*;
pub use sink::*;
pub use source::*;
pub use telemetry::*;
pub use template::*;
