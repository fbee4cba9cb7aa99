//! Template Registry error types

use thiserror::Error;

/// Template Registry specific error
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No definition backs the requested name
    #[error("template not found: '{name}'")]
    TemplateNotFound { name: String },

    /// Definition or config file could not be parsed
    #[error("parse error in {origin}: {message}")]
    Parse {
        origin: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Definition parsed but is structurally invalid
    #[error("template '{template}' is invalid at '{field}': {message}")]
    Invalid {
        template: String,
        field: String,
        message: String,
    },

    /// Repository retrieval failed
    #[error("git error: {message}")]
    Git { message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Create template not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    /// Create parse error without an underlying source
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create validation error
    pub fn invalid(
        template: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            template: template.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create git error
    pub fn git(message: impl Into<String>) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, RegistryError>;
