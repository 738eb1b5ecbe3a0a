//! Short-lived passphrase cache.
//!
//! After a successful unlock the verified passphrase is written to a
//! small side file so the next few commands do not prompt again.  The
//! file holds base64 of `nonce ‖ ciphertext` wrapping
//! `{"password": ..., "expires_at": ...}`, encrypted with a key derived
//! from the machine hostname.  The key is never written anywhere;
//! changing the hostname silently invalidates every cache file.
//!
//! Expiry is a data-level check at read time, not a scheduled eviction.

pub mod cleanup;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::config::paths;
use crate::crypto::encryption::{open, seal};
use crate::crypto::kdf::derive_cache_key;
use crate::crypto::keys::DerivedKey;
use crate::errors::{Result, StrongboxError};
use crate::vault::format;

/// File name of the cache inside the per-user config directory.
pub const CACHE_FILE_NAME: &str = "passphrase.cache";

/// Hostname used when the real one cannot be read.
const FALLBACK_HOSTNAME: &str = "localhost";

#[derive(Serialize, Deserialize)]
struct CachedPassphrase {
    password: String,
    expires_at: DateTime<Utc>,
}

impl Drop for CachedPassphrase {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Where the cache lives and the key that protects it.
pub struct CacheConfig {
    path: PathBuf,
    key: DerivedKey,
}

impl CacheConfig {
    /// Build a config from an explicit path and an already-derived key.
    pub fn new(path: impl Into<PathBuf>, key: DerivedKey) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Derive the cache key from `hostname` and the static cache label.
    pub fn for_host(path: impl Into<PathBuf>, hostname: &str) -> Result<Self> {
        Ok(Self::new(path, derive_cache_key(hostname)?))
    }

    /// The per-user cache file keyed to this machine's hostname.
    pub fn from_environment() -> Result<Self> {
        let path = paths::cache_dir().join(CACHE_FILE_NAME);
        Self::for_host(path, &current_hostname())
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read the machine hostname, falling back to a fixed name.
pub fn current_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}

/// Thread-safe handle to the passphrase cache.
///
/// Reads take a shared lock and writes/deletes an exclusive one, so the
/// termination cleanup task cannot remove the file while a command is
/// halfway through reading it.
pub struct PassphraseCache {
    inner: RwLock<CacheConfig>,
}

impl PassphraseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Path of the cache file.
    pub fn path(&self) -> PathBuf {
        self.read().path.clone()
    }

    /// Cache `passphrase` for `ttl`.  A zero or negative TTL clears the cache.
    pub fn remember(&self, passphrase: &str, ttl: Duration) -> Result<()> {
        if ttl <= Duration::zero() {
            return self.forget();
        }

        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| StrongboxError::InvalidInput("cache TTL is out of range".into()))?;

        let record = CachedPassphrase {
            password: passphrase.to_string(),
            expires_at,
        };
        let plaintext = serde_json::to_vec(&record)
            .map(Zeroizing::new)
            .map_err(|e| StrongboxError::SerializationError(format!("cache record: {e}")))?;

        let config = self.write();
        let sealed = seal(config.key.as_bytes(), &plaintext)?;
        format::write_atomic(&config.path, BASE64.encode(sealed).as_bytes())
            .map_err(|e| StrongboxError::CacheUnavailable(e.to_string()))?;

        debug!(path = %config.path.display(), %expires_at, "passphrase cached");
        Ok(())
    }

    /// Return the cached passphrase if present and not expired.
    ///
    /// A cache that cannot be decoded or decrypted is reported as empty:
    /// a broken cache must never stand between the user and the store.
    pub fn recall(&self) -> Result<Option<Zeroizing<String>>> {
        {
            let config = self.read();

            let Some(encoded) = read_cache_file(&config)? else {
                return Ok(None);
            };

            let Some(record) = decode_record(&config.key, encoded.trim()) else {
                warn!(
                    path = %config.path.display(),
                    "ignoring unreadable passphrase cache"
                );
                return Ok(None);
            };

            if Utc::now() <= record.expires_at {
                return Ok(Some(Zeroizing::new(record.password.clone())));
            }
        }

        debug!("cached passphrase expired");
        self.forget_if_expired()?;
        Ok(None)
    }

    /// Delete the cache file.  A missing file is not an error.
    pub fn forget(&self) -> Result<()> {
        remove_cache_file(&self.write())
    }

    /// Delete the cache file only if it still holds an expired record.
    ///
    /// The check runs again under the write lock so a `remember` that
    /// landed after the read is kept.
    fn forget_if_expired(&self) -> Result<()> {
        let config = self.write();
        let Some(encoded) = read_cache_file(&config)? else {
            return Ok(());
        };

        let expired = decode_record(&config.key, encoded.trim())
            .is_some_and(|record| Utc::now() > record.expires_at);
        if expired {
            remove_cache_file(&config)
        } else {
            Ok(())
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheConfig> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheConfig> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_cache_file(config: &CacheConfig) -> Result<Option<Zeroizing<String>>> {
    match fs::read_to_string(&config.path) {
        Ok(text) => Ok(Some(Zeroizing::new(text))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StrongboxError::CacheUnavailable(format!(
            "read {}: {e}",
            config.path.display()
        ))),
    }
}

fn remove_cache_file(config: &CacheConfig) -> Result<()> {
    match fs::remove_file(&config.path) {
        Ok(()) => {
            debug!(path = %config.path.display(), "passphrase cache cleared");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StrongboxError::CacheUnavailable(format!(
            "remove {}: {e}",
            config.path.display()
        ))),
    }
}

fn decode_record(key: &DerivedKey, encoded: &str) -> Option<CachedPassphrase> {
    let sealed = BASE64.decode(encoded).ok()?;
    let plaintext = open(key.as_bytes(), &sealed).map(Zeroizing::new).ok()?;
    serde_json::from_slice(&plaintext).ok()
}
