//! CsvSource - reads a delimited file and streams it in blocks

use std::path::{Path, PathBuf};

use contracts::{BlockRequest, BlockSize, ContractError, Params, Row, Source, SourceBase, DEFAULT_SEP};
use tracing::{info, instrument};

use super::{blocksize, pump};

/// Configuration for CsvSource
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSourceConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    pub has_header: bool,
    /// Explicit column names; the header row is used when absent
    pub columns: Option<Vec<String>>,
    pub blocksize: BlockSize,
    /// Object written to; defaults to the file stem
    pub object_id: String,
    pub sep: String,
}

impl CsvSourceConfig {
    /// Consume the source's fields from its parameter bag
    pub fn from_params(params: &mut Params) -> Result<Self, ContractError> {
        let path = PathBuf::from(params.required_str("path")?);
        let delimiter = match params.optional_str("delimiter")? {
            None => b',',
            Some(d) if d.len() == 1 => d.as_bytes()[0],
            Some(d) => {
                return Err(ContractError::invalid_field(
                    params.component(),
                    "delimiter",
                    format!("expected a single byte, got '{d}'"),
                ))
            }
        };
        let object_id = match params.optional_str("object_id")? {
            Some(id) => id,
            None => default_object_id(&path),
        };

        Ok(Self {
            delimiter,
            has_header: params.optional("has_header")?.unwrap_or(true),
            columns: params.optional("columns")?,
            blocksize: blocksize(params)?,
            sep: params.optional_str("sep")?.unwrap_or_else(|| DEFAULT_SEP.to_string()),
            object_id,
            path,
        })
    }
}

fn default_object_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string()
}

/// Source reading rows from a CSV file
pub struct CsvSource {
    base: SourceBase,
    config: CsvSourceConfig,
}

impl CsvSource {
    pub fn new(mut base: SourceBase) -> Result<Self, ContractError> {
        let config = CsvSourceConfig::from_params(base.params_mut())?;
        Ok(Self { base, config })
    }

    pub fn config(&self) -> &CsvSourceConfig {
        &self.config
    }

    fn read_error(&self, error: impl std::fmt::Display) -> ContractError {
        ContractError::read(
            &self.base.name,
            format!("{}: {error}", self.config.path.display()),
        )
    }
}

impl Source for CsvSource {
    fn base(&self) -> &SourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SourceBase {
        &mut self.base
    }

    fn supports_connect(&self) -> bool {
        true
    }

    /// Check that the input file is readable
    fn connect(&mut self) -> Result<(), ContractError> {
        std::fs::File::open(&self.config.path).map_err(|e| self.read_error(e))?;
        Ok(())
    }

    #[instrument(
        name = "csv_source_run",
        skip(self),
        fields(source = %self.base.name, path = %self.config.path.display())
    )]
    fn run(&mut self) -> Result<(), ContractError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_path(&self.config.path)
            .map_err(|e| self.read_error(e))?;

        let columns: Option<Vec<String>> = match &self.config.columns {
            Some(columns) => Some(columns.clone()),
            None if self.config.has_header => Some(
                reader
                    .headers()
                    .map_err(|e| self.read_error(e))?
                    .iter()
                    .map(str::to_string)
                    .collect(),
            ),
            None => None,
        };

        let mut request = BlockRequest::new(&self.config.object_id)
            .with_blocksize(self.config.blocksize)
            .with_sep(&self.config.sep);
        if let Some(columns) = &columns {
            request = request.with_columns(columns);
        }

        let mut failure = None;
        let rows = reader.records().map_while(|record| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect::<Row>()),
            Err(e) => {
                failure = Some(e);
                None
            }
        });
        let total = pump(&self.base, rows, &request)?;
        if let Some(e) = failure {
            return Err(self.read_error(e));
        }

        info!(rows = total, object_id = %self.config.object_id, "csv source finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{share_sink, BlockRecord, ExecutionHints, Sink, SinkBase};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Captures blocks as (object_id, columns, rows)
    type Captured = Arc<Mutex<Vec<(String, Option<Vec<String>>, Vec<Row>)>>>;

    struct CaptureSink {
        base: SinkBase,
        blocks: Captured,
    }

    impl Sink for CaptureSink {
        fn base(&self) -> &SinkBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut SinkBase {
            &mut self.base
        }

        fn write_block(
            &mut self,
            rows: &mut dyn Iterator<Item = Row>,
            request: &BlockRequest<'_>,
        ) -> Result<usize, ContractError> {
            let block: Vec<Row> = rows.take(request.blocksize.limit()).collect();
            self.base.record_block(&BlockRecord {
                object_id: request.object_id,
                rows: block.len(),
                bytes: 0,
                columns: request.columns,
            });
            let n = block.len();
            self.blocks.lock().push((
                request.object_id.to_string(),
                request.columns.map(<[String]>::to_vec),
                block,
            ));
            Ok(n)
        }
    }

    fn source(fields: serde_json::Value) -> (CsvSource, Captured) {
        let fields = serde_json::from_value(fields).unwrap();
        let params = Params::new("src1", fields, BTreeMap::new());
        let mut base = SourceBase::new("src1", "csv", vec!["snk1".into()], ExecutionHints::default(), params);

        let blocks = Captured::default();
        let sink = CaptureSink {
            base: SinkBase::new("snk1", "capture", None, Params::default()),
            blocks: Arc::clone(&blocks),
        };
        base.add_sink("snk1", share_sink(Box::new(sink)));
        (CsvSource::new(base).unwrap(), blocks)
    }

    #[test]
    fn test_defaults() {
        let (src, _) = source(json!({"path": "data/orders.csv"}));
        let config = src.config();
        assert_eq!(config.delimiter, b',');
        assert!(config.has_header);
        assert_eq!(config.blocksize, BlockSize::All);
        assert_eq!(config.object_id, "orders");
        assert_eq!(config.sep, "\t");
        assert!(src.base().params().fields().is_empty());
    }

    #[test]
    fn test_zero_blocksize_rejected() {
        let fields = serde_json::from_value(json!({"path": "orders.csv", "blocksize": 0})).unwrap();
        let params = Params::new("src1", fields, BTreeMap::new());
        let base = SourceBase::new("src1", "csv", vec![], ExecutionHints::default(), params);

        let err = CsvSource::new(base).err().unwrap();
        assert_eq!(err.key(), Some("blocksize"));
    }

    #[test]
    fn test_streams_in_blocks_with_header_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "id,city\n1,Oslo\n2,Lima\n3,Pune\n").unwrap();

        let (mut src, blocks) = source(json!({"path": path.to_str().unwrap(), "blocksize": 2}));
        src.connect().unwrap();
        src.run().unwrap();

        let blocks = blocks.lock();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, "orders");
        assert_eq!(blocks[0].1, Some(vec!["id".to_string(), "city".to_string()]));
        assert_eq!(blocks[0].2, vec![vec!["1", "Oslo"], vec!["2", "Lima"]]);
        assert_eq!(blocks[1].2, vec![vec!["3", "Pune"]]);
    }

    #[test]
    fn test_headerless_with_custom_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.txt");
        std::fs::write(&path, "a;b\nc;d\n").unwrap();

        let (mut src, blocks) = source(json!({
            "path": path.to_str().unwrap(),
            "delimiter": ";",
            "has_header": false,
            "object_id": "letters",
        }));
        src.run().unwrap();

        let blocks = blocks.lock();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].0, "letters");
        assert_eq!(blocks[0].1, None);
        assert_eq!(blocks[0].2, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_connect_reports_missing_file() {
        let dir = tempdir().unwrap();
        let (mut src, _) = source(json!({"path": dir.path().join("nope.csv").to_str().unwrap()}));
        assert!(src.supports_connect());
        let err = src.connect().unwrap_err();
        assert!(matches!(err, ContractError::Read { .. }), "got: {err}");
    }

    #[test]
    fn test_invalid_delimiter() {
        let params = Params::new(
            "src1",
            serde_json::from_value(json!({"path": "x.csv", "delimiter": "||"})).unwrap(),
            BTreeMap::new(),
        );
        let base = SourceBase::new("src1", "csv", vec![], ExecutionHints::default(), params);
        let err = CsvSource::new(base).err().unwrap();
        assert_eq!(err.key(), Some("delimiter"));
    }
}
