//! Definition parsing
//!
//! TOML (primary) and JSON formats, for both template definitions and
//! runtime configs.

use serde::de::DeserializeOwned;

use crate::error::{RegistryError, Result};

/// File format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Formats tried, in order, when resolving a template by name
    pub const SEARCH_ORDER: [ConfigFormat; 2] = [ConfigFormat::Toml, ConfigFormat::Json];

    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Canonical extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Parse TOML content
pub fn parse_toml<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| RegistryError::Parse {
        origin: origin.to_string(),
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON content
pub fn parse_json<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| RegistryError::Parse {
        origin: origin.to_string(),
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to format
pub fn parse<T: DeserializeOwned>(content: &str, format: ConfigFormat, origin: &str) -> Result<T> {
    match format {
        ConfigFormat::Toml => parse_toml(content, origin),
        ConfigFormat::Json => parse_json(content, origin),
    }
}
