//! Per-user directories.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::warn;

use crate::vault::format::ensure_private_dir;

pub const APP_QUALIFIER: &str = "dev";
pub const APP_ORG: &str = "strongbox";
pub const APP_NAME: &str = "strongbox";

/// Name of the encrypted store inside the data directory.
pub const STORE_FILE_NAME: &str = "store.dat";

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Used when the platform has no notion of a home directory.
fn fallback_dir() -> PathBuf {
    std::env::temp_dir().join(APP_NAME)
}

pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(fallback_dir)
}

pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(fallback_dir)
}

/// Directory for the passphrase cache: the per-user config directory,
/// created owner-only on demand.
///
/// Falls back to the system temp directory if it cannot be created.
pub fn cache_dir() -> PathBuf {
    private_dir_or_temp(config_dir())
}

fn private_dir_or_temp(dir: PathBuf) -> PathBuf {
    match ensure_private_dir(&dir) {
        Ok(()) => dir,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cache directory unavailable, using temp dir");
            std::env::temp_dir()
        }
    }
}

pub fn default_store_path() -> PathBuf {
    data_dir().join(STORE_FILE_NAME)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}
