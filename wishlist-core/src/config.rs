//! Registry configuration discovery
//!
//! Locates the `wishlist.json` and `catalog.json` documents a registry
//! operates on.
//!
//! Resolution order:
//! 1. Explicit path (CLI `--config`)
//! 2. `WISHLIST_CONFIG` environment variable
//! 3. `.wishlist/config.yml` in the working directory
//! 4. `config.yml` in the platform user config directory
//! 5. Defaults: `wishlist.json` and `catalog.json` in the working directory
//!
//! Relative document paths in a config file resolve against the directory
//! holding that file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::store::JsonFileStore;

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "WISHLIST_CONFIG";

/// Project-local config file, relative to the working directory
pub const PROJECT_CONFIG_FILE: &str = ".wishlist/config.yml";

pub const DEFAULT_WISHLIST_FILE: &str = "wishlist.json";
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// Where the registry documents live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_wishlist_path")]
    pub wishlist_path: PathBuf,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

fn default_wishlist_path() -> PathBuf {
    PathBuf::from(DEFAULT_WISHLIST_FILE)
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_FILE)
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            wishlist_path: default_wishlist_path(),
            catalog_path: default_catalog_path(),
        }
    }
}

impl RegistryConfig {
    /// Discover configuration relative to the current working directory
    pub fn discover(cli_override: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        Self::discover_in(&cwd, cli_override, Self::user_config_path().as_deref())
    }

    /// Discover configuration relative to `base_dir`, with `user_config` as
    /// the fallback before defaults
    pub fn discover_in(
        base_dir: &Path,
        cli_override: Option<PathBuf>,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            debug!("Using --config override: {}", path.display());
            return Self::load_from_path(&base_dir.join(path));
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            if !env_path.trim().is_empty() {
                debug!("Using {} = {}", CONFIG_ENV_VAR, env_path);
                return Self::load_from_path(&base_dir.join(env_path));
            }
        }

        let project = base_dir.join(PROJECT_CONFIG_FILE);
        if project.exists() {
            info!("Found project configuration at {}", project.display());
            return Self::load_from_path(&project);
        }

        if let Some(user) = user_config.filter(|p| p.exists()) {
            info!("Found user configuration at {}", user.display());
            return Self::load_from_path(user);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default().resolved_against(base_dir))
    }

    /// Load a config file; a missing explicitly-named file is an error
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry config: {}", path.display()))?;
        let config: RegistryConfig = if content.trim().is_empty() {
            RegistryConfig::default()
        } else {
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("Failed to parse registry config: {}", path.display()))?
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Platform user config file, e.g. `~/.config/wishlist/config.yml`
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wishlist")
            .map(|dirs| dirs.config_dir().join("config.yml"))
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        if self.wishlist_path.is_relative() {
            self.wishlist_path = base.join(&self.wishlist_path);
        }
        if self.catalog_path.is_relative() {
            self.catalog_path = base.join(&self.catalog_path);
        }
        self
    }

    /// Replace individual document paths (CLI `--wishlist` / `--catalog`)
    pub fn with_overrides(mut self, wishlist: Option<PathBuf>, catalog: Option<PathBuf>) -> Self {
        if let Some(path) = wishlist {
            self.wishlist_path = path;
        }
        if let Some(path) = catalog {
            self.catalog_path = path;
        }
        self
    }

    pub fn open_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.wishlist_path, &self.catalog_path)
    }

    /// Write this config as YAML, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self).context("Failed to serialize registry config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write registry config: {}", path.display()))?;
        Ok(())
    }
}
