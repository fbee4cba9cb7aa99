//! Shared command setup: runtime config, template registry and runner.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{ParamValue, RuntimeConfig};
use runner::PipeRunner;
use template_registry::{
    load_runtime_config, FsTemplateRegistry, GitRegistryConfig, GitTemplateRegistry,
    TemplateRegistry,
};
use tracing::info;

use crate::cli::TemplateArgs;
use crate::error::CliError;

pub type Runner = PipeRunner<Box<dyn TemplateRegistry>>;

/// Build the runtime config from the config file, `--template` and `--set`
pub fn runtime_config(args: &TemplateArgs) -> Result<RuntimeConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RuntimeConfig::default(),
    };

    if let Some(name) = &args.template {
        config.template_name = name.clone();
    }
    if config.template_name.is_empty() {
        return Err(CliError::NoTemplateSelected.into());
    }

    for raw in &args.overrides {
        let (key, value) = parse_override(raw)?;
        config.params.insert(key, value);
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<RuntimeConfig> {
    if !path.exists() {
        anyhow::bail!("Runtime config not found: {}", path.display());
    }
    load_runtime_config(path)
        .with_context(|| format!("Failed to load runtime config from {}", path.display()))
}

/// Split `key=value`; the value is read as JSON when it parses, else as text
pub fn parse_override(raw: &str) -> Result<(String, ParamValue), CliError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| CliError::invalid_override(raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| ParamValue::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

/// Pick the registry strategy from the arguments
pub fn registry_from_args(args: &TemplateArgs) -> Result<Box<dyn TemplateRegistry>> {
    if let Some(url) = &args.git_url {
        let cache_dir = args.cache_dir.clone().ok_or(CliError::NoTemplateSource)?;
        info!(url = %url, cache = %cache_dir.display(), "Using git template registry");
        let mut config = GitRegistryConfig::new(url.clone(), cache_dir);
        config.reference = args.git_ref.clone();
        config.subdir = args.git_subdir.clone();
        return Ok(Box::new(GitTemplateRegistry::new(config)));
    }

    let root = args.templates.clone().ok_or(CliError::NoTemplateSource)?;
    info!(root = %root.display(), "Using filesystem template registry");
    Ok(Box::new(FsTemplateRegistry::new(root)))
}

/// Runner with the built-in adapters registered
pub fn build_runner(args: &TemplateArgs) -> Result<Runner> {
    let registry = registry_from_args(args)?;
    Ok(PipeRunner::new(registry, adapters::builtin_registry()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn args() -> TemplateArgs {
        TemplateArgs {
            config: None,
            template: None,
            templates: None,
            git_url: None,
            cache_dir: None,
            git_ref: None,
            git_subdir: None,
            overrides: Vec::new(),
        }
    }

    #[test]
    fn test_parse_override_values() {
        assert_eq!(parse_override("blocksize=10").unwrap(), ("blocksize".into(), json!(10)));
        assert_eq!(parse_override("append=true").unwrap(), ("append".into(), json!(true)));
        assert_eq!(
            parse_override("snk1.directory=/tmp/out").unwrap(),
            ("snk1.directory".into(), json!("/tmp/out"))
        );
        assert_eq!(parse_override("sep=a=b").unwrap(), ("sep".into(), json!("a=b")));
        assert!(parse_override("novalue").is_err());
        assert!(parse_override("=x").is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "template_name = \"daily\"\n[params]\nblocksize = 100\n").unwrap();

        let mut args = args();
        args.config = Some(path);
        args.overrides = vec!["blocksize=5".into()];

        let config = runtime_config(&args).unwrap();
        assert_eq!(config.template_name, "daily");
        assert_eq!(config.params["blocksize"], json!(5));
    }

    #[test]
    fn test_template_required() {
        let err = runtime_config(&args()).unwrap_err();
        assert!(err.to_string().contains("no template selected"));
    }

    #[test]
    fn test_registry_source_required() {
        assert!(registry_from_args(&args()).is_err());

        let mut args = args();
        args.templates = Some("templates".into());
        assert!(registry_from_args(&args).is_ok());
    }
}
