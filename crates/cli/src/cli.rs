//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pipectl - run parameterized pipeline templates
#[derive(Parser, Debug)]
#[command(
    name = "pipectl",
    author,
    version,
    about = "Template-driven data pipeline runner",
    long_about = "Resolves a named pipeline template, compiles it with runtime parameters \n\
                  and credentials, then runs every source into its sinks and reports \n\
                  per-sink write telemetry."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PIPECTL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "PIPECTL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, compile and run a template
    Run(RunArgs),

    /// Print the compiled template without running it
    Render(RenderArgs),

    /// Check that a template resolves and compiles
    Validate(ValidateArgs),
}

/// Where templates come from and which one to use
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Runtime config file (TOML or JSON)
    #[arg(
        short,
        long,
        env = "PIPECTL_CONFIG",
        required_unless_present = "template"
    )]
    pub config: Option<PathBuf>,

    /// Template name; overrides the config's template_name
    #[arg(short, long)]
    pub template: Option<String>,

    /// Directory holding template files
    #[arg(long, env = "PIPECTL_TEMPLATES", conflicts_with = "git_url")]
    pub templates: Option<PathBuf>,

    /// Git repository holding template files
    #[arg(long, env = "PIPECTL_GIT_URL", requires = "cache_dir")]
    pub git_url: Option<String>,

    /// Local checkout directory for --git-url
    #[arg(long, env = "PIPECTL_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Branch, tag or commit to check out
    #[arg(long, env = "PIPECTL_GIT_REF")]
    pub git_ref: Option<String>,

    /// Directory inside the repository holding templates
    #[arg(long)]
    pub git_subdir: Option<PathBuf>,

    /// Parameter override, `key=value` or `component.key=value` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "PIPECTL_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `render` command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub template: TemplateArgs,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "pipectl",
            "run",
            "--template",
            "daily",
            "--templates",
            "tpl",
            "--set",
            "blocksize=10",
            "--set",
            "snk1.directory=/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.template.template.as_deref(), Some("daily"));
                assert_eq!(args.template.overrides.len(), 2);
                assert_eq!(args.metrics_port, 0);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_git_url_requires_cache_dir() {
        let result = Cli::try_parse_from(["pipectl", "render", "-t", "daily", "--git-url", "repo.git"]);
        assert!(result.is_err());
    }
}
