//! Binary store file format and atomic persistence.
//!
//! A store file has this layout:
//!
//! ```text
//! [salt: 16 bytes][nonce: 12 bytes][ciphertext + GCM tag: N bytes]
//! ```
//!
//! - **Salt**: Argon2id salt.  Generated once when the file is first
//!   written and reused on every later save to the same path.
//! - **Nonce**: fresh random AES-GCM nonce for this particular save.
//! - **Ciphertext**: the JSON-serialized `SecretStore`, encrypted and
//!   authenticated with the derived key.
//!
//! Nothing else is stored: no magic, no header, no plaintext.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use crate::crypto::encryption::NONCE_LEN;
use crate::crypto::kdf::SALT_LEN;
use crate::errors::{Result, StrongboxError};

/// Fixed-size prefix: 16 (salt) + 12 (nonce).
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// The three sections of an encrypted store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFile {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedFile {
    /// Split raw file bytes into salt, nonce, and ciphertext.
    ///
    /// Anything shorter than the fixed prefix is a corrupt store.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(StrongboxError::CorruptStore(format!(
                "file is {} bytes, expected at least {HEADER_LEN}",
                data.len()
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[..SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[SALT_LEN..HEADER_LEN]);

        Ok(Self {
            salt,
            nonce,
            ciphertext: data[HEADER_LEN..].to_vec(),
        })
    }

    /// Concatenate `salt ‖ nonce ‖ ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }
}

/// What was found at a store path.
#[derive(Debug)]
pub enum StoreFile {
    /// No file exists yet; the store is created lazily on first save.
    Missing,
    /// A zero-length file; treated the same as missing.
    Empty,
    /// A file with a well-formed prefix.
    Sealed(EncryptedFile),
}

/// Read a store file from disk and split it into its sections.
pub fn read_store_file(path: &Path) -> Result<StoreFile> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreFile::Missing),
        Err(e) => return Err(e.into()),
    };

    if data.is_empty() {
        return Ok(StoreFile::Empty);
    }

    EncryptedFile::from_bytes(&data).map(StoreFile::Sealed)
}

/// Return the salt of the store file at `path`, if there is one.
///
/// A missing or empty file yields `None` (the caller generates a fresh
/// salt).  A non-empty file shorter than the fixed prefix is corrupt
/// and is never mined for a salt.
pub fn existing_salt(path: &Path) -> Result<Option<[u8; SALT_LEN]>> {
    match read_store_file(path)? {
        StoreFile::Missing | StoreFile::Empty => Ok(None),
        StoreFile::Sealed(file) => Ok(Some(file.salt)),
    }
}

/// Write `data` to `path` **atomically** with owner-only permissions.
///
/// 1. Create the parent directory (0700) if it is missing.
/// 2. Write to a hidden temp file in the same directory (0600) and sync it.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.  If any
/// step fails the temp file is removed and the old target is untouched.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_private_dir(parent)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_private_file(&tmp_path, data).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|e| {
            StrongboxError::persistence(format!("rename into {}", path.display()), e)
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

/// Create `dir` (and its parents) if needed, restricting the leaf to the owner.
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    debug!(dir = %dir.display(), "creating directory");
    fs::create_dir_all(dir).map_err(|e| {
        StrongboxError::persistence(format!("directory {}", dir.display()), e)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
            StrongboxError::persistence(format!("permissions of {}", dir.display()), e)
        })?;
    }

    Ok(())
}

fn write_private_file(path: &Path, data: &[u8]) -> Result<()> {
    let context = || format!("temp file {}", path.display());

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| StrongboxError::persistence(context(), e))?;
    file.write_all(data)
        .map_err(|e| StrongboxError::persistence(context(), e))?;
    file.sync_all()
        .map_err(|e| StrongboxError::persistence(context(), e))?;

    // A stale temp file from an earlier crash keeps its old mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| StrongboxError::persistence(context(), e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn encrypted_file_layout() {
        let file = EncryptedFile {
            salt: [1u8; SALT_LEN],
            nonce: [2u8; NONCE_LEN],
            ciphertext: vec![3, 4, 5],
        };
        let bytes = file.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 3);
        assert_eq!(&bytes[..16], &[1u8; 16]);
        assert_eq!(&bytes[16..28], &[2u8; 12]);
        assert_eq!(EncryptedFile::from_bytes(&bytes).unwrap(), file);
    }

    #[test]
    fn short_file_is_corrupt() {
        let result = EncryptedFile::from_bytes(&[0u8; HEADER_LEN - 1]);
        assert!(matches!(result, Err(StrongboxError::CorruptStore(_))));
    }

    #[test]
    fn missing_and_empty_files_are_distinguished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.dat");
        assert!(matches!(
            read_store_file(&path).unwrap(),
            StoreFile::Missing
        ));

        fs::write(&path, b"").unwrap();
        assert!(matches!(read_store_file(&path).unwrap(), StoreFile::Empty));
    }

    #[test]
    fn existing_salt_refuses_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.dat");
        fs::write(&path, [9u8; 20]).unwrap();
        assert!(matches!(
            existing_salt(&path),
            Err(StrongboxError::CorruptStore(_))
        ));
    }

    #[test]
    fn write_atomic_creates_parent_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.dat");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("nested").join(".store.dat.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_uses_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("vault");
        let path = sub.join("store.dat");
        write_atomic(&path, b"data").unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode();
        let dir_mode = fs::metadata(&sub).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn write_atomic_reports_persistence_failure() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let result = write_atomic(&blocker.join("store.dat"), b"data");
        assert!(matches!(
            result,
            Err(StrongboxError::PersistenceFailure { .. })
        ));
    }
}
