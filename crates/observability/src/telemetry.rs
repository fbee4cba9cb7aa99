//! Sink write telemetry
//!
//! [`SinkTelemetry`] is the default [`Telemetry`] handle the compiler attaches
//! to every sink. It accumulates an in-memory snapshot for the run report and
//! mirrors each block into `metrics` counters labelled by sink.

use std::collections::BTreeMap;

use contracts::{BlockRecord, Telemetry, TelemetrySnapshot};
use metrics::{counter, histogram};
use serde_json::{json, Value};

/// Record one written block in the global metrics recorder
pub fn record_block_metrics(sink_name: &str, record: &BlockRecord<'_>) {
    counter!("pipeline_blocks_written_total", "sink" => sink_name.to_string()).increment(1);
    counter!("pipeline_rows_written_total", "sink" => sink_name.to_string())
        .increment(record.rows as u64);
    counter!("pipeline_bytes_written_total", "sink" => sink_name.to_string())
        .increment(record.bytes as u64);
    histogram!("pipeline_block_rows", "sink" => sink_name.to_string()).record(record.rows as f64);
}

/// Default telemetry handle for one sink
#[derive(Debug, Clone, Default)]
pub struct SinkTelemetry {
    sink_name: String,
    rows: u64,
    blocks: u64,
    bytes: u64,
    objects: BTreeMap<String, u64>,
    columns: Option<Vec<String>>,
    block_rows: RunningStats,
}

impl SinkTelemetry {
    pub fn new(sink_name: impl Into<String>) -> Self {
        Self {
            sink_name: sink_name.into(),
            ..Default::default()
        }
    }

    /// Boxed handle, ready for `Sink::enable_telemetry`
    pub fn boxed(sink_name: &str) -> Box<dyn Telemetry> {
        Box::new(Self::new(sink_name))
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Telemetry for SinkTelemetry {
    fn record_block(&mut self, record: &BlockRecord<'_>) {
        self.rows += record.rows as u64;
        self.blocks += 1;
        self.bytes += record.bytes as u64;
        *self.objects.entry(record.object_id.to_string()).or_insert(0) += record.rows as u64;
        if self.columns.is_none() {
            self.columns = record.columns.map(<[String]>::to_vec);
        }
        self.block_rows.push(record.rows as f64);

        record_block_metrics(&self.sink_name, record);
    }

    fn dump(self: Box<Self>) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot.insert("rows_written".into(), json!(self.rows));
        snapshot.insert("blocks_written".into(), json!(self.blocks));
        snapshot.insert("bytes_written".into(), json!(self.bytes));
        snapshot.insert("objects".into(), json!(self.objects));
        if let Some(columns) = self.columns {
            snapshot.insert("columns".into(), json!(columns));
        }
        if self.block_rows.count() > 0 {
            snapshot.insert("block_rows".into(), self.block_rows.to_value());
        }
        snapshot
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Summary as JSON, `null` when nothing was recorded
    pub fn to_value(&self) -> Value {
        if self.count == 0 {
            Value::Null
        } else {
            json!({"count": self.count, "min": self.min, "max": self.max, "mean": self.mean})
        }
    }
}
