//! Sink implementations
//!
//! Contains LocalFileSink and LogSink.

mod file;
mod log;

pub use self::file::{FileSinkConfig, LocalFileSink};
pub use self::log::LogSink;
