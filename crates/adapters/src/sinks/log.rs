//! LogSink - logs block summaries via tracing

use contracts::{BlockRecord, BlockRequest, ContractError, Row, Sink, SinkBase};
use tracing::{debug, info, instrument};

/// Sink that logs each block for debugging
pub struct LogSink {
    base: SinkBase,
    /// Rows echoed at debug level per block
    preview: usize,
}

impl LogSink {
    pub fn new(mut base: SinkBase) -> Result<Self, ContractError> {
        let preview = base.params_mut().optional("preview")?.unwrap_or(0);
        Ok(Self { base, preview })
    }
}

impl Sink for LogSink {
    fn base(&self) -> &SinkBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SinkBase {
        &mut self.base
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, rows, request),
        fields(sink = %self.base.name, object_id = request.object_id)
    )]
    fn write_block(
        &mut self,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> Result<usize, ContractError> {
        let mut written = 0;
        let mut bytes = 0;
        for row in rows.take(request.blocksize.limit()) {
            let line = row.join(request.sep);
            if written < self.preview {
                debug!(row = written, line = %line, "row");
            }
            bytes += line.len() + 1;
            written += 1;
        }

        info!(
            rows = written,
            bytes,
            columns = ?request.columns,
            "block received"
        );
        self.base.record_block(&BlockRecord {
            object_id: request.object_id,
            rows: written,
            bytes,
            columns: request.columns,
        });
        Ok(written)
    }
}
