//! Component-level error definitions
//!
//! Categorized by source: configuration / capability / telemetry / write

use thiserror::Error;

/// Error raised by a component (source or sink) or by its parameter bag
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Required parameter absent (or already consumed)
    #[error("component '{component}': required field '{field}' is not set")]
    MissingField { component: String, field: String },

    /// Required credential absent (or already consumed)
    #[error("component '{component}': required credential '{credential}' is not set")]
    MissingCredential {
        component: String,
        credential: String,
    },

    /// Parameter present but of the wrong shape
    #[error("component '{component}': field '{field}' is invalid: {message}")]
    InvalidField {
        component: String,
        field: String,
        message: String,
    },

    // ===== Capability Errors =====
    /// Optional capability declined by the adapter
    #[error("component '{component}' does not implement '{capability}'")]
    CapabilityUnimplemented {
        component: String,
        capability: String,
    },

    // ===== Telemetry Errors =====
    /// Telemetry handle attached twice
    #[error("sink '{sink_name}' already has a telemetry handle attached")]
    TelemetryAlreadyAttached { sink_name: String },

    // ===== Adapter Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    Write { sink_name: String, message: String },

    /// Source read error
    #[error("source '{source_name}' read error: {message}")]
    Read {
        source_name: String,
        message: String,
    },

    /// Source has nothing wired to write into
    #[error("source '{source_name}' has no sinks attached")]
    NoSinks { source_name: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create missing field error
    pub fn missing_field(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            component: component.into(),
            field: field.into(),
        }
    }

    /// Create missing credential error
    pub fn missing_credential(component: impl Into<String>, credential: impl Into<String>) -> Self {
        Self::MissingCredential {
            component: component.into(),
            credential: credential.into(),
        }
    }

    /// Create invalid field error
    pub fn invalid_field(
        component: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            component: component.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create capability-unimplemented error
    pub fn unimplemented(component: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::CapabilityUnimplemented {
            component: component.into(),
            capability: capability.into(),
        }
    }

    /// Create sink write error
    pub fn write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create source read error
    pub fn read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// The parameter or credential key this error is about, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidField { field, .. } => Some(field),
            Self::MissingCredential { credential, .. } => Some(credential),
            _ => None,
        }
    }

    /// Whether this is the "optional capability declined" signal
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::CapabilityUnimplemented { .. })
    }
}
