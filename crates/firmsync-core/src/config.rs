//! Downloader configuration.
//!
//! Values come from built-in defaults, an optional `firmsync.toml`, and
//! environment overrides, in increasing order of precedence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "firmsync.toml";
pub const BASE_DIR_ENV: &str = "FIRMSYNC_BASE_DIR";
pub const GIT_PATH_ENV: &str = "FIRMSYNC_GIT_PATH";

/// Where clones live and where to look for git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_directory: PathBuf,
    pub search_path: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_directory: Option<PathBuf>,
    search_path: Option<Vec<PathBuf>>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let base_directory = dirs::cache_dir()
            .map(|p| p.join("firmsync").join("firmware"))
            .unwrap_or_else(|| PathBuf::from(".firmsync").join("firmware"));
        let search_path = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self {
            base_directory,
            search_path,
        }
    }
}

impl FetchConfig {
    /// Load configuration from `path` (or the default config file if it
    /// exists) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::default().merge_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::default().merge_file(&path)?,
                None => Self::default(),
            },
        };
        Ok(config.with_env(|key| std::env::var_os(key)))
    }

    /// Overlay values from a TOML file.
    pub fn merge_file(self, path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        self.merge_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Overlay values from TOML content.
    pub fn merge_str(mut self, content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        if let Some(base_directory) = file.base_directory {
            self.base_directory = base_directory;
        }
        if let Some(search_path) = file.search_path {
            self.search_path = search_path;
        }
        Ok(self)
    }

    /// Apply `FIRMSYNC_BASE_DIR` and `FIRMSYNC_GIT_PATH` from `lookup`.
    ///
    /// The search path variable uses the platform path separator.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(base) = lookup(BASE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.base_directory = PathBuf::from(base);
        }
        if let Some(paths) = lookup(GIT_PATH_ENV).filter(|v| !v.is_empty()) {
            self.search_path = std::env::split_paths(&paths).collect();
        }
        self
    }
}

/// `<config dir>/firmsync/firmsync.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("firmsync").join(CONFIG_FILE_NAME))
}
