//! Configuration for cmd-cache

use crate::error::{Error, Result};
use crate::fingerprint::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache root used when neither a flag nor a config file names one.
pub const DEFAULT_CACHE_DIR: &str = ".cmd_cache";

/// Name of the optional per-project settings file.
pub const CONFIG_FILE_NAME: &str = ".cmd-cache.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<HashAlgorithm>,

    // Directory of the file these settings were read from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        settings.base_dir = path.parent().map(Path::to_path_buf);
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` looking for a settings file.
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest settings file, or defaults when there is none.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Pick the cache root: explicit override, then settings, then the default.
    ///
    /// A relative `cache_dir` from a settings file is resolved against the
    /// directory containing that file.
    pub fn resolve_cache_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(dir) = cli_override {
            return dir.to_path_buf();
        }

        match (&self.cache_dir, &self.base_dir) {
            (Some(dir), Some(base)) if dir.is_relative() => base.join(dir),
            (Some(dir), _) => dir.clone(),
            (None, _) => PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

    /// Pick the key digest: explicit override, then settings, then SHA-1.
    pub fn resolve_algorithm(&self, cli_override: Option<HashAlgorithm>) -> HashAlgorithm {
        cli_override.or(self.algorithm).unwrap_or_default()
    }
}
