//! Repository-backed template registry
//!
//! Templates live in a git repository. On first lookup the repository is
//! cloned into a local cache (or the existing cache is fetched), the
//! requested reference is checked out, and lookups are then served by a
//! [`FsTemplateRegistry`] rooted inside the checkout.

use std::path::{Path, PathBuf};
use std::process::Command;

use contracts::TemplateDefinition;
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{RegistryError, Result};
use crate::fs::FsTemplateRegistry;
use crate::TemplateRegistry;

/// Reference fetched when none is configured
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Git registry configuration
#[derive(Debug, Clone)]
pub struct GitRegistryConfig {
    /// Repository location (anything `git clone` accepts)
    pub url: String,
    /// Local checkout directory
    pub cache_dir: PathBuf,
    /// Branch, tag or commit to check out
    pub reference: Option<String>,
    /// Directory inside the repository holding the templates
    pub subdir: Option<PathBuf>,
}

impl GitRegistryConfig {
    pub fn new(url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            cache_dir: cache_dir.into(),
            reference: None,
            subdir: None,
        }
    }

    fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(DEFAULT_REFERENCE)
    }

    fn templates_root(&self) -> PathBuf {
        match &self.subdir {
            Some(subdir) => self.cache_dir.join(subdir),
            None => self.cache_dir.clone(),
        }
    }
}

/// Registry serving definitions from a cached repository checkout
pub struct GitTemplateRegistry {
    config: GitRegistryConfig,
    local: FsTemplateRegistry,
    synced: Mutex<bool>,
}

impl GitTemplateRegistry {
    pub fn new(config: GitRegistryConfig) -> Self {
        let local = FsTemplateRegistry::new(config.templates_root());
        Self {
            config,
            local,
            synced: Mutex::new(false),
        }
    }

    pub fn config(&self) -> &GitRegistryConfig {
        &self.config
    }

    /// Fetch and check out the configured reference again
    pub fn refresh(&self) -> Result<()> {
        let mut synced = self.synced.lock();
        self.sync()?;
        *synced = true;
        Ok(())
    }

    fn ensure_synced(&self) -> Result<()> {
        let mut synced = self.synced.lock();
        if !*synced {
            self.sync()?;
            *synced = true;
        }
        Ok(())
    }

    #[instrument(
        name = "git_registry_sync",
        skip(self),
        fields(url = %self.config.url, reference = %self.config.reference())
    )]
    fn sync(&self) -> Result<()> {
        let cache = &self.config.cache_dir;
        if cache.join(".git").exists() {
            debug!(cache = %cache.display(), "reusing cached checkout");
        } else {
            if let Some(parent) = cache.parent() {
                std::fs::create_dir_all(parent)?;
            }
            info!(cache = %cache.display(), "cloning template repository");
            run_git(None, &["clone", "--quiet", &self.config.url, &path_arg(cache)?])?;
        }

        run_git(Some(cache), &["fetch", "--quiet", "origin", self.config.reference()])?;
        run_git(Some(cache), &["checkout", "--quiet", "--detach", "FETCH_HEAD"])?;
        info!("template repository synced");
        Ok(())
    }
}

impl TemplateRegistry for GitTemplateRegistry {
    fn get_template_by_name(&self, name: &str) -> Result<TemplateDefinition> {
        self.ensure_synced()?;
        self.local.get_template_by_name(name)
    }
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| RegistryError::git(format!("non UTF-8 path: {}", path.display())))
}

/// Run a git subcommand, surfacing stderr on failure
fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<()> {
    let mut command = Command::new("git");
    if let Some(dir) = dir {
        command.arg("-C").arg(dir);
    }
    let output = command
        .args(args)
        .output()
        .map_err(|e| RegistryError::git(format!("failed to run git: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(RegistryError::git(format!(
            "`git {}` failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}
