//! LocalFileSink - writes blocks as delimited text files

use contracts::{BlockRecord, BlockRequest, ContractError, Params, Row, Sink, SinkBase};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for LocalFileSink
#[derive(Debug, Clone, PartialEq)]
pub struct FileSinkConfig {
    /// Output directory; one file per object id
    pub directory: PathBuf,
    /// Keep existing file contents instead of truncating on first write
    pub append: bool,
}

impl FileSinkConfig {
    /// Consume the sink's fields from its parameter bag
    pub fn from_params(params: &mut Params) -> Result<Self, ContractError> {
        Ok(Self {
            directory: PathBuf::from(params.required_str("directory")?),
            append: params.optional("append")?.unwrap_or(false),
        })
    }
}

/// Sink writing `sep`-joined lines to `<directory>/<object_id>`
pub struct LocalFileSink {
    base: SinkBase,
    config: FileSinkConfig,
    /// Objects already opened during this run
    touched: HashSet<String>,
}

impl LocalFileSink {
    pub fn new(mut base: SinkBase) -> Result<Self, ContractError> {
        let config = FileSinkConfig::from_params(base.params_mut())?;
        Ok(Self::with_config(base, config))
    }

    pub fn with_config(base: SinkBase, config: FileSinkConfig) -> Self {
        Self {
            base,
            config,
            touched: HashSet::new(),
        }
    }

    pub fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    fn object_path(&self, object_id: &str) -> Result<PathBuf, ContractError> {
        if object_id.is_empty()
            || object_id.contains(['/', '\\'])
            || object_id == "."
            || object_id == ".."
        {
            return Err(ContractError::write(
                &self.base.name,
                format!("invalid object id '{object_id}'"),
            ));
        }
        Ok(self.config.directory.join(object_id))
    }

    fn write_rows(
        &mut self,
        path: PathBuf,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> std::io::Result<(usize, usize)> {
        let first_touch = self.touched.insert(request.object_id.to_string());
        let truncate = first_touch && !self.config.append;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let mut written = 0;
        let mut bytes = 0;
        for row in rows.take(request.blocksize.limit()) {
            let line = row.join(request.sep);
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            bytes += line.len() + 1;
            written += 1;
        }
        writer.flush()?;
        Ok((written, bytes))
    }
}

impl Sink for LocalFileSink {
    fn base(&self) -> &SinkBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SinkBase {
        &mut self.base
    }

    #[instrument(
        name = "local_file_sink_connect",
        skip(self),
        fields(sink = %self.base.name, directory = %self.config.directory.display())
    )]
    fn connect(&mut self) -> Result<(), ContractError> {
        fs::create_dir_all(&self.config.directory).map_err(|e| {
            error!(error = %e, "Cannot create output directory");
            ContractError::write(&self.base.name, e.to_string())
        })?;
        debug!("output directory ready");
        Ok(())
    }

    #[instrument(
        name = "local_file_sink_write",
        skip(self, rows, request),
        fields(sink = %self.base.name, object_id = request.object_id)
    )]
    fn write_block(
        &mut self,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> Result<usize, ContractError> {
        let path = self.object_path(request.object_id)?;
        let (written, bytes) = self.write_rows(path, rows, request).map_err(|e| {
            error!(error = %e, "Write failed");
            ContractError::write(&self.base.name, e.to_string())
        })?;

        self.base.record_block(&BlockRecord {
            object_id: request.object_id,
            rows: written,
            bytes,
            columns: request.columns,
        });
        debug!(rows = written, bytes, "block written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::BlockSize;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn sink(directory: &std::path::Path, append: bool) -> LocalFileSink {
        let fields = BTreeMap::from([
            ("directory".to_string(), json!(directory.to_str().unwrap())),
            ("append".to_string(), json!(append)),
        ]);
        let base = SinkBase::new("snk1", "local_file", None, Params::new("snk1", fields, BTreeMap::new()));
        LocalFileSink::new(base).unwrap()
    }

    fn rows(values: &[&[&str]]) -> Vec<Row> {
        values
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_config_consumes_fields() {
        let dir = tempdir().unwrap();
        let sink = sink(dir.path(), false);
        assert!(sink.base().params().fields().is_empty());
        assert!(!sink.config().append);
    }

    #[test]
    fn test_missing_directory() {
        let base = SinkBase::new("snk1", "local_file", None, Params::default());
        let err = LocalFileSink::new(base).err().unwrap();
        assert_eq!(err.key(), Some("directory"));
    }

    #[test]
    fn test_connect_creates_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let mut sink = sink(&out, false);
        sink.connect().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_connect_failure_names_the_sink() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "").unwrap();
        let mut sink = sink(&blocker.join("out"), false);

        let err = sink.connect().unwrap_err();
        assert!(matches!(err, ContractError::Write { ref sink_name, .. } if sink_name == "snk1"));
    }

    #[test]
    fn test_blocks_append_within_a_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("orders"), "stale\n").unwrap();
        let mut sink = sink(dir.path(), false);
        sink.connect().unwrap();

        let mut data = rows(&[&["1", "a"], &["2", "b"], &["3", "c"]]).into_iter();
        let request = BlockRequest::new("orders").with_blocksize(BlockSize::Rows(2)).with_sep(",");
        assert_eq!(sink.write_block(&mut data, &request).unwrap(), 2);
        assert_eq!(sink.write_block(&mut data, &request).unwrap(), 1);

        let content = fs::read_to_string(dir.path().join("orders")).unwrap();
        assert_eq!(content, "1,a\n2,b\n3,c\n");
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("orders"), "0\tz\n").unwrap();
        let mut sink = sink(dir.path(), true);

        let mut data = rows(&[&["1", "a"]]).into_iter();
        sink.write_block(&mut data, &BlockRequest::new("orders")).unwrap();

        let content = fs::read_to_string(dir.path().join("orders")).unwrap();
        assert_eq!(content, "0\tz\n1\ta\n");
    }

    #[test]
    fn test_object_id_cannot_escape_directory() {
        let dir = tempdir().unwrap();
        let mut sink = sink(dir.path(), false);
        let mut data = rows(&[&["1"]]).into_iter();
        let err = sink.write_block(&mut data, &BlockRequest::new("../x")).unwrap_err();
        assert!(matches!(err, ContractError::Write { .. }));
    }
}
