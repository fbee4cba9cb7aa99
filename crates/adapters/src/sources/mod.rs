//! Source implementations
//!
//! Contains CsvSource and StaticSource.

mod csv;
mod static_rows;

pub use self::csv::{CsvSource, CsvSourceConfig};
pub use self::static_rows::{StaticSource, StaticSourceConfig};

use contracts::{BlockRequest, BlockSize, ContractError, Params, Row, SourceBase};

/// Read the optional `blocksize` field; zero rows per block can never finish
pub(crate) fn blocksize(params: &mut Params) -> Result<BlockSize, ContractError> {
    match params.optional("blocksize")?.unwrap_or_default() {
        BlockSize::Rows(0) => Err(ContractError::invalid_field(
            params.component(),
            "blocksize",
            "must be a positive row count, or negative for all rows",
        )),
        blocksize => Ok(blocksize),
    }
}

/// Push `rows` through the source's sinks block by block
///
/// Returns the number of rows handed out.
pub(crate) fn pump<I>(
    base: &SourceBase,
    rows: I,
    request: &BlockRequest<'_>,
) -> Result<usize, ContractError>
where
    I: Iterator<Item = Row>,
{
    let mut rows = rows.peekable();
    let mut total = 0;
    while rows.peek().is_some() {
        let written = base.write_block(&mut rows, request)?;
        if written == 0 {
            return Err(ContractError::read(
                &base.name,
                "sinks accepted no rows from a non-empty block",
            ));
        }
        total += written;
    }
    Ok(total)
}
