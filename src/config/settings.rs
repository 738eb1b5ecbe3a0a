use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths;
use crate::errors::{Result, StrongboxError};

/// User configuration, loaded from `config.toml`.
///
/// Every field has a default so strongbox works without any config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Location of the encrypted store.  Defaults to `<data dir>/store.dat`.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Where backups are written.  Defaults to `<store dir>/backups`.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Seconds a verified passphrase stays cached (0 disables the cache).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_cache_ttl_secs() -> i64 {
    300
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: None,
            backup_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents).map_err(|e| {
            StrongboxError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// The store path: `override_path`, then the config value, then the default.
    pub fn resolve_store_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.store_path.clone())
            .unwrap_or_else(paths::default_store_path)
    }

    /// The backup directory for a store living at `store_path`.
    pub fn resolve_backup_dir(&self, store_path: &Path) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| store_dir(store_path).join("backups"))
    }

    /// Cache lifetime as a duration; zero or negative disables caching.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.cache_ttl_secs).unwrap_or_else(chrono::Duration::zero)
    }
}

/// Directory containing the store file.
pub fn store_dir(store_path: &Path) -> PathBuf {
    match store_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
