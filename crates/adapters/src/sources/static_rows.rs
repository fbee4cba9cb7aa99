//! StaticSource - rows declared inline in the template

use contracts::{
    BlockRequest, BlockSize, ContractError, ParamValue, Params, Row, Source, SourceBase, DEFAULT_SEP,
};
use tracing::{info, instrument};

use super::{blocksize, pump};

/// Configuration for StaticSource
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSourceConfig {
    pub rows: Vec<Row>,
    pub columns: Option<Vec<String>>,
    pub blocksize: BlockSize,
    pub object_id: String,
    pub sep: String,
}

impl StaticSourceConfig {
    /// Consume the source's fields from its parameter bag
    ///
    /// Scalar cells are rendered as text; nested values are rejected.
    pub fn from_params(params: &mut Params) -> Result<Self, ContractError> {
        let raw: Vec<Vec<ParamValue>> = params.required("rows")?;
        let component = params.component().to_string();
        let rows = raw
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell_text(&component, cell)).collect())
            .collect::<Result<Vec<Row>, _>>()?;

        Ok(Self {
            rows,
            columns: params.optional("columns")?,
            blocksize: blocksize(params)?,
            object_id: params.optional_str("object_id")?.unwrap_or(component),
            sep: params.optional_str("sep")?.unwrap_or_else(|| DEFAULT_SEP.to_string()),
        })
    }
}

fn cell_text(component: &str, cell: ParamValue) -> Result<String, ContractError> {
    match cell {
        ParamValue::String(s) => Ok(s),
        ParamValue::Null => Ok(String::new()),
        ParamValue::Number(n) => Ok(n.to_string()),
        ParamValue::Bool(b) => Ok(b.to_string()),
        other => Err(ContractError::invalid_field(
            component,
            "rows",
            format!("cells must be scalars, got {other}"),
        )),
    }
}

/// Source emitting a fixed set of rows
pub struct StaticSource {
    base: SourceBase,
    config: StaticSourceConfig,
}

impl StaticSource {
    pub fn new(mut base: SourceBase) -> Result<Self, ContractError> {
        let config = StaticSourceConfig::from_params(base.params_mut())?;
        Ok(Self { base, config })
    }

    pub fn config(&self) -> &StaticSourceConfig {
        &self.config
    }
}

impl Source for StaticSource {
    fn base(&self) -> &SourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SourceBase {
        &mut self.base
    }

    #[instrument(
        name = "static_source_run",
        skip(self),
        fields(source = %self.base.name, rows = self.config.rows.len())
    )]
    fn run(&mut self) -> Result<(), ContractError> {
        let mut request = BlockRequest::new(&self.config.object_id)
            .with_blocksize(self.config.blocksize)
            .with_sep(&self.config.sep);
        if let Some(columns) = &self.config.columns {
            request = request.with_columns(columns);
        }

        let total = pump(&self.base, self.config.rows.iter().cloned(), &request)?;
        info!(rows = total, "static source finished");
        Ok(())
    }
}
