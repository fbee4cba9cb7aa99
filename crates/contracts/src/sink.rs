//! Sink trait - pipeline output interface
//!
//! Defines the abstract interface for sinks and the state every sink shares.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::{BlockRecord, BlockRequest, ContractError, ParamValue, Params, Row, Telemetry};

/// Sink handle shared between the compiled template and the sources using it
pub type SharedSink = Arc<Mutex<Box<dyn Sink>>>;

/// Wrap a sink for sharing
pub fn share_sink(sink: Box<dyn Sink>) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// State common to every sink
///
/// Built by the compiler from the sink's component spec and handed to the
/// adapter constructor, which keeps it.
pub struct SinkBase {
    /// Unique component name
    pub name: String,
    /// Plugin type tag
    pub kind: String,
    /// Optional payload shape tag
    pub data_type: Option<String>,
    params: Params,
    telemetry: Option<Box<dyn Telemetry>>,
}

impl SinkBase {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        data_type: Option<String>,
        params: Params,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            data_type,
            params,
            telemetry: None,
        }
    }

    /// Parameter bag (remaining entries)
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

    /// Attach the telemetry handle; only one attach is allowed
    pub fn enable_telemetry(&mut self, telemetry: Box<dyn Telemetry>) -> Result<(), ContractError> {
        if self.telemetry.is_some() {
            return Err(ContractError::TelemetryAlreadyAttached {
                sink_name: self.name.clone(),
            });
        }
        self.telemetry = Some(telemetry);
        Ok(())
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry.is_some()
    }

    /// Detach the handle for the terminal dump
    pub fn take_telemetry(&mut self) -> Option<Box<dyn Telemetry>> {
        self.telemetry.take()
    }

    /// Feed one written block to the telemetry handle, if attached
    pub fn record_block(&mut self, record: &BlockRecord<'_>) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.record_block(record);
        }
    }
}

impl fmt::Debug for SinkBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkBase")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("data_type", &self.data_type)
            .field("telemetry_enabled", &self.telemetry_enabled())
            .finish_non_exhaustive()
    }
}

/// Data output trait
///
/// All sink adapters implement this trait.
pub trait Sink: Send {
    fn base(&self) -> &SinkBase;

    fn base_mut(&mut self) -> &mut SinkBase;

    /// Sink name (used for wiring, logging and the telemetry report)
    fn name(&self) -> &str {
        &self.base().name
    }

    /// Prepare the destination; called by the owning source before it runs
    fn connect(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Write one block
    ///
    /// Consumes at most `request.blocksize` rows from `rows` (all of them for
    /// [`crate::BlockSize::All`]) into the object `request.object_id`, updating
    /// telemetry as it goes. Returns the number of rows written.
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write_block(
        &mut self,
        rows: &mut dyn Iterator<Item = Row>,
        request: &BlockRequest<'_>,
    ) -> Result<usize, ContractError>;

    fn enable_telemetry(&mut self, telemetry: Box<dyn Telemetry>) -> Result<(), ContractError> {
        self.base_mut().enable_telemetry(telemetry)
    }

    fn telemetry_enabled(&self) -> bool {
        self.base().telemetry_enabled()
    }

    fn take_telemetry(&mut self) -> Option<Box<dyn Telemetry>> {
        self.base_mut().take_telemetry()
    }

    fn required_field(&mut self, name: &str) -> Result<ParamValue, ContractError> {
        self.base_mut().required_field(name)
    }

    fn required_credential(&mut self, name: &str) -> Result<String, ContractError> {
        self.base_mut().required_credential(name)
    }
}
