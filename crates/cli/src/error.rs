//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Neither a template directory nor a repository was given
    #[error("no template source: pass --templates <dir> or --git-url <url> --cache-dir <dir>")]
    NoTemplateSource,

    /// A `--set` argument is not `key=value`
    #[error("invalid override '{raw}': expected KEY=VALUE")]
    InvalidOverride { raw: String },

    /// Neither a config file nor a template name was given
    #[error("no template selected: pass --config <file> or --template <name>")]
    NoTemplateSelected,
}

impl CliError {
    pub fn invalid_override(raw: impl Into<String>) -> Self {
        Self::InvalidOverride { raw: raw.into() }
    }
}
