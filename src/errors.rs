use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Strongbox.
#[derive(Debug, Error)]
pub enum StrongboxError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: authentication check did not pass")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Store errors ---
    #[error("Invalid passphrase or corrupted store data")]
    InvalidPassphraseOrCorruptData,

    #[error("Store is corrupt: {0} (restore it from a backup)")]
    CorruptStore(String),

    #[error("Store schema version {0} is newer than this build supports")]
    UnsupportedVersion(u32),

    #[error("Failed to persist {context}: {source}")]
    PersistenceFailure {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Store already exists at {0}")]
    StoreAlreadyExists(PathBuf),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Secret '{0}' already exists (use `update` to change it)")]
    SecretAlreadyExists(String),

    // --- Cache errors ---
    #[error("Passphrase cache unavailable: {0}")]
    CacheUnavailable(String),

    // --- Backup errors ---
    #[error("Backup failed: {0}")]
    BackupFailed(String),

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Passphrases do not match")]
    PasswordMismatch,
}

impl StrongboxError {
    /// Wrap an I/O error raised while writing, renaming, or creating
    /// directories for a persisted file.
    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::PersistenceFailure {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Strongbox results.
pub type Result<T> = std::result::Result<T, StrongboxError>;
