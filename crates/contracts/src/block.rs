//! Row blocks - the unit of data moved from a source to its sinks

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row: a tuple of string fields
pub type Row = Vec<String>;

/// Default field separator used when writing rows
pub const DEFAULT_SEP: &str = "\t";

/// Number of rows to take from an iterator for one block
///
/// Deserializes from an integer; any negative value (the legacy `-1`)
/// means "take everything that is left".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum BlockSize {
    /// At most this many rows
    Rows(usize),
    /// Until the iterator is exhausted
    #[default]
    All,
}

impl BlockSize {
    /// Upper bound on rows taken for this block
    pub fn limit(self) -> usize {
        match self {
            Self::Rows(n) => n,
            Self::All => usize::MAX,
        }
    }

    /// Whether the block is unbounded
    pub fn is_all(self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<i64> for BlockSize {
    fn from(value: i64) -> Self {
        usize::try_from(value).map_or(Self::All, Self::Rows)
    }
}

impl From<BlockSize> for i64 {
    fn from(value: BlockSize) -> Self {
        match value {
            BlockSize::Rows(n) => i64::try_from(n).unwrap_or(i64::MAX),
            BlockSize::All => -1,
        }
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(n) => write!(f, "{n}"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Parameters of one `write_block` call
#[derive(Debug, Clone, Copy)]
pub struct BlockRequest<'a> {
    /// Object written to, e.g. a file name or an object-store key
    pub object_id: &'a str,
    /// Rows to take from the iterator
    pub blocksize: BlockSize,
    /// Column names, used to label telemetry
    pub columns: Option<&'a [String]>,
    /// Field separator used when serializing rows
    pub sep: &'a str,
}

impl<'a> BlockRequest<'a> {
    /// Request writing everything to `object_id` with the default separator
    pub fn new(object_id: &'a str) -> Self {
        Self {
            object_id,
            blocksize: BlockSize::All,
            columns: None,
            sep: DEFAULT_SEP,
        }
    }

    pub fn with_blocksize(mut self, blocksize: BlockSize) -> Self {
        self.blocksize = blocksize;
        self
    }

    pub fn with_columns(mut self, columns: &'a [String]) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_sep(mut self, sep: &'a str) -> Self {
        self.sep = sep;
        self
    }
}
