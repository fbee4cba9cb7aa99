//! Runner error types

use compiler::CompileError;
use contracts::ContractError;
use template_registry::RegistryError;
use thiserror::Error;

/// Pipeline execution error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Template lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Template compilation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A source or its sinks could not connect
    #[error("component '{component}' failed to connect: {error}")]
    ConnectFailure {
        component: String,
        #[source]
        error: ContractError,
    },

    /// A source's run() failed; the pipeline halts
    #[error("source '{source_name}' failed: {error}")]
    AdapterRunFailure {
        source_name: String,
        #[source]
        error: ContractError,
    },
}

impl PipelineError {
    pub fn connect(component: impl Into<String>, error: ContractError) -> Self {
        Self::ConnectFailure {
            component: component.into(),
            error,
        }
    }

    pub fn run(source_name: impl Into<String>, error: ContractError) -> Self {
        Self::AdapterRunFailure {
            source_name: source_name.into(),
            error,
        }
    }

    pub fn is_template_not_found(&self) -> bool {
        matches!(self, Self::Registry(e) if e.is_not_found())
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, PipelineError>;
