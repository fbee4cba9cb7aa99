//! Compiler error types

use contracts::ContractError;
use thiserror::Error;

/// Template compilation error
#[derive(Debug, Error)]
pub enum CompileError {
    /// No constructor registered for a component's type tag
    #[error("component '{component}': unknown plugin type '{plugin_type}'")]
    UnknownPluginType {
        plugin_type: String,
        component: String,
    },

    /// A component could not be configured or constructed
    #[error("component '{component}': invalid configuration for '{key}': {message}")]
    ComponentConfiguration {
        component: String,
        key: String,
        message: String,
    },

    /// A source names a sink that the template does not declare
    #[error("source '{source_name}' references undeclared sink '{sink}'")]
    DanglingSinkReference { source_name: String, sink: String },

    /// Two components share a name
    #[error("duplicate component name '{name}'")]
    DuplicateComponent { name: String },
}

impl CompileError {
    pub fn unknown_type(plugin_type: impl Into<String>, component: impl Into<String>) -> Self {
        Self::UnknownPluginType {
            plugin_type: plugin_type.into(),
            component: component.into(),
        }
    }

    pub fn configuration(
        component: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ComponentConfiguration {
            component: component.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn dangling(source_name: impl Into<String>, sink: impl Into<String>) -> Self {
        Self::DanglingSinkReference {
            source_name: source_name.into(),
            sink: sink.into(),
        }
    }

    /// Map a construction failure of `component` into a configuration error
    pub fn from_contract(component: &str, error: ContractError) -> Self {
        let key = error.key().unwrap_or("*").to_string();
        Self::ComponentConfiguration {
            component: component.to_string(),
            key,
            message: error.to_string(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CompileError>;
