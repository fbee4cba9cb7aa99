//! # Template Registry
//!
//! Resolves template names to parsed, structurally valid
//! [`TemplateDefinition`]s.
//!
//! Responsibilities:
//! - Parse TOML/JSON definition files and runtime configs
//! - Validate definitions (names, type tags, uniqueness)
//! - Serve definitions from a directory or a git repository checkout
//!
//! # Example
//!
//! ```no_run
//! use template_registry::{FsTemplateRegistry, TemplateRegistry};
//!
//! let registry = FsTemplateRegistry::new("templates");
//! let definition = registry.get_template_by_name("daily").unwrap();
//! println!("{} sources", definition.sources.len());
//! ```

mod error;
mod fs;
mod git;
mod parser;
mod validator;

pub use contracts::{RuntimeConfig, TemplateDefinition};
pub use error::{RegistryError, Result};
pub use fs::{load_definition, FsTemplateRegistry};
pub use git::{GitRegistryConfig, GitTemplateRegistry, DEFAULT_REFERENCE};
pub use parser::{parse, parse_json, parse_toml, ConfigFormat};
pub use validator::validate;

use std::path::Path;
use std::sync::Arc;

/// Name-to-definition lookup
///
/// Implementations must be safe to share between threads; the runner holds
/// one registry for its whole lifetime.
pub trait TemplateRegistry: Send + Sync {
    /// Resolve `name` to a validated definition
    ///
    /// # Errors
    /// - [`RegistryError::TemplateNotFound`] when nothing backs the name
    /// - parse, validation and retrieval failures otherwise
    fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition>;
}

impl<T: TemplateRegistry + ?Sized> TemplateRegistry for Box<T> {
    fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition> {
        (**self).get_template_by_name(name)
    }
}

impl<T: TemplateRegistry + ?Sized> TemplateRegistry for Arc<T> {
    fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition> {
        (**self).get_template_by_name(name)
    }
}

/// Load a runtime config, detecting the format from the file extension
pub fn load_runtime_config(path: &Path) -> Result<RuntimeConfig> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parser::parse(&content, format, &path.display().to_string())
}

/// Infer file format from extension
pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let origin = path.display().to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| RegistryError::parse(&origin, "cannot determine file format from extension"))?;
    ConfigFormat::from_extension(ext)
        .ok_or_else(|| RegistryError::parse(&origin, format!("unsupported file format: .{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    struct InMemory(BTreeMap<String, TemplateDefinition>);

    impl TemplateRegistry for InMemory {
        fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition> {
            self.0.get(name).cloned().ok_or_else(|| RegistryError::not_found(name))
        }
    }

    #[test]
    fn test_load_runtime_config_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
template_name = "daily"

[credentials]
token = "secret"

[params]
blocksize = 10
"snk1.directory" = "/tmp/out"
"#,
        )
        .unwrap();

        let config = load_runtime_config(&path).unwrap();
        assert_eq!(config.template_name, "daily");
        assert_eq!(config.params.get("blocksize"), Some(&json!(10)));
        assert_eq!(config.params.get("snk1.directory"), Some(&json!("/tmp/out")));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = detect_format(Path::new("run.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported file format"));
        assert!(detect_format(Path::new("run")).is_err());
    }

    #[test]
    fn test_shared_registry_delegates() {
        let mut templates = BTreeMap::new();
        templates.insert("daily".to_string(), TemplateDefinition::new("daily"));
        let shared: Arc<dyn TemplateRegistry> = Arc::new(InMemory(templates));

        assert_eq!(shared.get_template_by_name("daily").unwrap().name, "daily");
        assert!(shared.get_template_by_name("ghost").unwrap_err().is_not_found());
    }
}
