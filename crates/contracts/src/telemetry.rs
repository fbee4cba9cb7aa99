//! Telemetry trait - per-sink write accumulator
//!
//! The handle is opaque to the engine: a sink feeds it one [`BlockRecord`]
//! per written block and the runner reads it exactly once via
//! [`Telemetry::dump`] after every source has finished.

use std::collections::BTreeMap;

/// Metric name -> value snapshot produced by [`Telemetry::dump`]
pub type TelemetrySnapshot = BTreeMap<String, serde_json::Value>;

/// Telemetry snapshots keyed by sink name; the result of a pipeline run
pub type TelemetryReport = BTreeMap<String, TelemetrySnapshot>;

/// Summary of one written block
#[derive(Debug, Clone, Copy)]
pub struct BlockRecord<'a> {
    pub object_id: &'a str,
    pub rows: usize,
    pub bytes: usize,
    pub columns: Option<&'a [String]>,
}

/// Write-metrics accumulator owned by a single sink
pub trait Telemetry: Send {
    /// Account for one written block
    fn record_block(&mut self, record: &BlockRecord<'_>);

    /// Terminal read; consumes the handle
    fn dump(self: Box<Self>) -> TelemetrySnapshot;
}
