//! Filesystem-rooted template registry
//!
//! A template named `daily` lives at `<root>/daily.toml` or
//! `<root>/daily.json` (tried in that order).

use std::path::{Path, PathBuf};

use contracts::TemplateDefinition;
use tracing::{debug, instrument};

use crate::error::{RegistryError, Result};
use crate::parser::{self, ConfigFormat};
use crate::{validator, TemplateRegistry};

/// Registry reading definitions from a directory
#[derive(Debug, Clone)]
pub struct FsTemplateRegistry {
    root: PathBuf,
}

impl FsTemplateRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path and format backing `name`, if any
    pub fn locate(&self, name: &str) -> Option<(PathBuf, ConfigFormat)> {
        if !is_plain_name(name) {
            return None;
        }
        ConfigFormat::SEARCH_ORDER.into_iter().find_map(|format| {
            let path = self.root.join(format!("{name}.{}", format.extension()));
            path.is_file().then_some((path, format))
        })
    }

    /// Names of all templates under the root, sorted
    pub fn template_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_template = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ConfigFormat::from_extension)
                .is_some();
            if is_template && path.is_file() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

impl TemplateRegistry for FsTemplateRegistry {
    #[instrument(name = "fs_registry_get_template", skip(self), fields(root = %self.root.display()))]
    fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition> {
        let (path, format) = self
            .locate(name)
            .ok_or_else(|| RegistryError::not_found(name))?;
        debug!(path = %path.display(), ?format, "resolved template file");

        let mut definition = load_definition(&path, format)?;
        if definition.name.is_empty() {
            definition.name = name.to_string();
        }
        validator::validate(&definition)?;
        Ok(definition)
    }
}

/// Load a definition file without validating it
pub fn load_definition(path: &Path, format: ConfigFormat) -> Result<TemplateDefinition> {
    let content = std::fs::read_to_string(path)?;
    parser::parse(&content, format, &path.display().to_string())
}

/// A bare file stem: no separators, no parent or hidden components
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}
