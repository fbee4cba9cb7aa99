//! Source trait - pipeline data producer abstraction
//!
//! A source reads rows from somewhere and pushes them, block by block, into
//! the sinks it was wired to at compile time.
//!
//! # Fan-out
//!
//! With one sink, [`SourceBase::write_block`] hands the iterator to that sink
//! untouched. With several sinks the block is tee'd: up to `blocksize` rows
//! are buffered once and the same rows are written to every sink, in
//! `sink_names` order.

use std::fmt;

use crate::{
    BlockRequest, ContractError, ExecutionHints, ParamValue, Params, Row, SharedSink,
};

/// State common to every source
pub struct SourceBase {
    /// Unique component name
    pub name: String,
    /// Plugin type tag
    pub kind: String,
    /// Sinks this source writes to, in declaration order
    pub sink_names: Vec<String>,
    /// Advisory execution hints; the engine never acts on them
    pub hints: ExecutionHints,
    params: Params,
    sinks: Vec<(String, SharedSink)>,
}

impl SourceBase {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        sink_names: Vec<String>,
        hints: ExecutionHints,
        params: Params,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            sink_names,
            hints,
            params,
            sinks: Vec::new(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Consume a required field, see [`Params::required_field`]
    pub fn required_field(&mut self, name: &str) -> Result<ParamValue, ContractError> {
        self.params.required_field(name)
    }

    /// Consume a required credential, see [`Params::required_credential`]
    pub fn required_credential(&mut self, name: &str) -> Result<String, ContractError> {
        self.params.required_credential(name)
    }

    /// Attach a sink under `name`; re-adding a name replaces the handle
    pub fn add_sink(&mut self, name: impl Into<String>, sink: SharedSink) {
        let name = name.into();
        match self.sinks.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = sink,
            None => self.sinks.push((name, sink)),
        }
    }

    /// Attached sinks, in wiring order
    pub fn sinks(&self) -> impl Iterator<Item = (&str, &SharedSink)> {
        self.sinks.iter().map(|(name, sink)| (name.as_str(), sink))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Names of attached sinks carrying a telemetry handle, in wiring order
    pub fn telemetry_sinks(&self) -> Vec<&str> {
        self.sinks
            .iter()
            .filter(|(_, sink)| sink.lock().telemetry_enabled())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Call `connect()` on every attached sink
    pub fn connect_sinks(&self) -> Result<(), ContractError> {
        for (_, sink) in &self.sinks {
            sink.lock().connect()?;
        }
        Ok(())
    }

    /// Push one block of rows into the attached sinks
    ///
    /// Returns the number of rows in the block.
    pub fn write_block(
        &self,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> Result<usize, ContractError> {
        match self.sinks.as_slice() {
            [] => Err(ContractError::NoSinks {
                source_name: self.name.clone(),
            }),
            [(_, sink)] => sink.lock().write_block(rows, request),
            sinks => {
                let block: Vec<Row> = rows.take(request.blocksize.limit()).collect();
                for (_, sink) in sinks {
                    let mut copy = block.iter().cloned();
                    sink.lock().write_block(&mut copy, request)?;
                }
                Ok(block.len())
            }
        }
    }
}

impl fmt::Debug for SourceBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wired: Vec<&str> = self.sinks.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("SourceBase")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("sink_names", &self.sink_names)
            .field("hints", &self.hints)
            .field("wired", &wired)
            .finish_non_exhaustive()
    }
}

/// Data source trait
///
/// All source adapters implement this trait.
pub trait Source: Send {
    fn base(&self) -> &SourceBase;

    fn base_mut(&mut self) -> &mut SourceBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    /// Whether [`Source::connect`] does anything; the runner skips it otherwise
    fn supports_connect(&self) -> bool {
        false
    }

    /// Open the upstream connection ahead of [`Source::run`]
    ///
    /// An adapter may return [`ContractError::CapabilityUnimplemented`] here;
    /// the runner treats that as a no-op.
    fn connect(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Cascade `connect()` to every owned sink
    fn connect_sinks(&mut self) -> Result<(), ContractError> {
        self.base().connect_sinks()
    }

    /// Produce all data; blocks until done
    fn run(&mut self) -> Result<(), ContractError>;

    /// Push a block into the owned sinks, see [`SourceBase::write_block`]
    fn write_block(
        &self,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> Result<usize, ContractError> {
        self.base().write_block(rows, request)
    }

    fn required_field(&mut self, name: &str) -> Result<ParamValue, ContractError> {
        self.base_mut().required_field(name)
    }

    fn required_credential(&mut self, name: &str) -> Result<String, ContractError> {
        self.base_mut().required_credential(name)
    }
}
