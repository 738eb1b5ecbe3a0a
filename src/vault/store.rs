//! The in-memory secret collection and its encrypted persistence.
//!
//! `SecretStore` owns every entry and enforces name uniqueness.
//! `load_store` / `save_store` / `initialize_store` compose the binary
//! format layer with Argon2id key derivation and AES-256-GCM.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::{derive_store_key, generate_salt};
use crate::errors::{Result, StrongboxError};

use super::format::{self, EncryptedFile, StoreFile};
use super::secret::SecretEntry;

/// Current plaintext schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Longest accepted secret name.
const MAX_NAME_LEN: usize = 256;

/// A named collection of secrets, serialized as
/// `{"version": 1, "secrets": [...]}` inside the encrypted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretStore {
    /// Forward-compatibility tag for the plaintext schema.
    pub version: u32,

    /// Entries in insertion order.
    #[serde(rename = "secrets", default, deserialize_with = "null_as_empty")]
    entries: Vec<SecretEntry>,
}

/// Field changes applied by `SecretStore::update`.
#[derive(Debug, Default, Clone)]
pub struct SecretUpdate {
    pub value: Option<String>,
    pub category: Option<String>,
}

impl SecretUpdate {
    /// Returns `true` if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.category.is_none()
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore {
    /// An empty store at the current schema version.
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            entries: Vec::new(),
        }
    }

    /// Build a store from entries whose names are already known to be unique.
    pub(crate) fn from_unique_entries(version: u32, entries: Vec<SecretEntry>) -> Self {
        Self { version, entries }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns the number of secrets in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no secrets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[SecretEntry] {
        &self.entries
    }

    /// Look up a secret by exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&SecretEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Returns `true` if the store contains a secret with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries whose category matches exactly.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a SecretEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Distinct non-empty categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|e| e.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        set.into_iter().collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a new secret.
    ///
    /// Rejects a name that already exists.  This happens purely in
    /// memory, so a rejected insert never reaches encryption or disk.
    pub fn insert(&mut self, entry: SecretEntry) -> Result<()> {
        validate_secret_name(&entry.name)?;
        if self.contains(&entry.name) {
            return Err(StrongboxError::SecretAlreadyExists(entry.name.clone()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Change the value and/or category of an existing secret.
    ///
    /// `created_at` is left untouched.
    pub fn update(&mut self, name: &str, update: SecretUpdate) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| StrongboxError::SecretNotFound(name.to_string()))?;

        if let Some(value) = update.value {
            entry.value.zeroize();
            entry.value = value;
        }
        if let Some(category) = update.category {
            entry.category = category;
        }
        Ok(())
    }

    /// Remove a secret and return it.
    pub fn remove(&mut self, name: &str) -> Result<SecretEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| StrongboxError::SecretNotFound(name.to_string()))?;
        Ok(self.entries.remove(index))
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Read and decrypt the store at `path`.
///
/// A missing or empty file is not an error: stores are created lazily on
/// first save, so an empty current-version store is returned instead.
pub fn load_store(path: &Path, passphrase: &str) -> Result<SecretStore> {
    let file = match format::read_store_file(path)? {
        StoreFile::Missing => {
            debug!(path = %path.display(), "store file does not exist, starting empty");
            return Ok(SecretStore::new());
        }
        StoreFile::Empty => {
            debug!(path = %path.display(), "store file is empty, starting empty");
            return Ok(SecretStore::new());
        }
        StoreFile::Sealed(file) => file,
    };

    let key = derive_store_key(passphrase, &file.salt)?;

    // A wrong passphrase and a tampered file are indistinguishable here.
    let plaintext = decrypt(key.as_bytes(), &file.ciphertext, &file.nonce)
        .map(Zeroizing::new)
        .map_err(|_| StrongboxError::InvalidPassphraseOrCorruptData)?;

    let store = parse_plaintext(&plaintext)?;
    debug!(entries = store.len(), "store loaded");
    Ok(store)
}

/// Encrypt `store` and write it to `path` atomically.
///
/// The salt of an existing file is reused so the derived key stays the
/// same across saves; every save still uses a fresh nonce.
pub fn save_store(path: &Path, passphrase: &str, store: &SecretStore) -> Result<()> {
    let salt = match format::existing_salt(path)? {
        Some(salt) => {
            debug!("reusing salt of existing store file");
            salt
        }
        None => {
            debug!("generating salt for new store file");
            generate_salt()
        }
    };

    let key = derive_store_key(passphrase, &salt)?;

    let plaintext = serde_json::to_vec(store)
        .map(Zeroizing::new)
        .map_err(|e| StrongboxError::SerializationError(format!("store: {e}")))?;

    let (ciphertext, nonce) = encrypt(key.as_bytes(), &plaintext)?;

    let file = EncryptedFile {
        salt,
        nonce,
        ciphertext,
    };
    format::write_atomic(path, &file.to_bytes())?;

    debug!(path = %path.display(), entries = store.len(), "store saved");
    Ok(())
}

/// Create an empty current-version store at `path`.
pub fn initialize_store(path: &Path, passphrase: &str) -> Result<()> {
    save_store(path, passphrase, &SecretStore::new())
}

fn parse_plaintext(bytes: &[u8]) -> Result<SecretStore> {
    let store: SecretStore = serde_json::from_slice(bytes)
        .map_err(|e| StrongboxError::CorruptStore(format!("plaintext is not a valid store: {e}")))?;

    if store.version > CURRENT_VERSION {
        return Err(StrongboxError::UnsupportedVersion(store.version));
    }

    let mut seen = HashSet::with_capacity(store.entries.len());
    for entry in &store.entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(StrongboxError::CorruptStore(format!(
                "duplicate secret name '{}'",
                entry.name
            )));
        }
    }

    Ok(store)
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<SecretEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SecretEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validate that a secret name is usable.
///
/// Must be non-empty, at most 256 bytes, and free of control characters.
fn validate_secret_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StrongboxError::InvalidInput(
            "secret name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StrongboxError::InvalidInput(format!(
            "secret name cannot exceed {MAX_NAME_LEN} bytes"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(StrongboxError::InvalidInput(format!(
            "secret name '{}' contains control characters",
            name.escape_debug()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> SecretStore {
        let mut store = SecretStore::new();
        for name in names {
            store.insert(SecretEntry::new(*name, "v", "")).unwrap();
        }
        store
    }

    #[test]
    fn new_store_is_current_version() {
        let store = SecretStore::new();
        assert_eq!(store.version, CURRENT_VERSION);
        assert!(store.is_empty());
    }

    #[test]
    fn insert_rejects_duplicate_name() {
        let mut store = store_with(&["github"]);
        let result = store.insert(SecretEntry::new("github", "other", ""));
        assert!(matches!(
            result,
            Err(StrongboxError::SecretAlreadyExists(ref n)) if n == "github"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut store = store_with(&["github"]);
        assert!(store.insert(SecretEntry::new("GitHub", "v", "")).is_ok());
    }

    #[test]
    fn insert_rejects_bad_names() {
        let mut store = SecretStore::new();
        assert!(store.insert(SecretEntry::new("", "v", "")).is_err());
        assert!(store.insert(SecretEntry::new("a\nb", "v", "")).is_err());
        assert!(store
            .insert(SecretEntry::new("x".repeat(257), "v", ""))
            .is_err());
    }

    #[test]
    fn update_keeps_created_at() {
        let mut store = store_with(&["db"]);
        let created = store.get("db").unwrap().created_at;

        store
            .update(
                "db",
                SecretUpdate {
                    value: Some("new".into()),
                    category: Some("infra".into()),
                },
            )
            .unwrap();

        let entry = store.get("db").unwrap();
        assert_eq!(entry.value, "new");
        assert_eq!(entry.category, "infra");
        assert_eq!(entry.created_at, created);
    }

    #[test]
    fn update_with_shorter_value_leaves_no_tail() {
        let mut store = SecretStore::new();
        store
            .insert(SecretEntry::new("token", "a-rather-long-old-secret", ""))
            .unwrap();

        store
            .update(
                "token",
                SecretUpdate {
                    value: Some("short".into()),
                    category: None,
                },
            )
            .unwrap();

        let entry = store.get("token").unwrap();
        assert_eq!(entry.value, "short");
        assert_eq!(entry.value.len(), 5);
        assert_eq!(entry.category, "");
    }

    #[test]
    fn update_and_remove_missing_name() {
        let mut store = SecretStore::new();
        assert!(matches!(
            store.update("nope", SecretUpdate::default()),
            Err(StrongboxError::SecretNotFound(_))
        ));
        assert!(matches!(
            store.remove("nope"),
            Err(StrongboxError::SecretNotFound(_))
        ));
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut store = store_with(&["a", "b", "c"]);
        store.remove("b").unwrap();
        let names: Vec<&str> = store.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let mut store = SecretStore::new();
        store.insert(SecretEntry::new("a", "1", "work")).unwrap();
        store.insert(SecretEntry::new("b", "2", "")).unwrap();
        store.insert(SecretEntry::new("c", "3", "home")).unwrap();
        store.insert(SecretEntry::new("d", "4", "work")).unwrap();

        assert_eq!(store.categories(), ["home", "work"]);
        assert_eq!(store.in_category("work").count(), 2);
    }

    #[test]
    fn plaintext_uses_secrets_key() {
        let store = store_with(&["a"]);
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["secrets"][0]["name"], "a");
    }

    #[test]
    fn parse_accepts_null_secrets() {
        let store = parse_plaintext(br#"{"version":1,"secrets":null}"#).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn parse_rejects_newer_version() {
        let result = parse_plaintext(br#"{"version":2,"secrets":[]}"#);
        assert!(matches!(result, Err(StrongboxError::UnsupportedVersion(2))));
    }

    #[test]
    fn parse_rejects_garbage_and_duplicates() {
        assert!(matches!(
            parse_plaintext(b"not json"),
            Err(StrongboxError::CorruptStore(_))
        ));

        let dup = br#"{"version":1,"secrets":[
            {"name":"a","value":"1","category":"","created_at":"2024-01-01T00:00:00Z"},
            {"name":"a","value":"2","category":"","created_at":"2024-01-01T00:00:00Z"}]}"#;
        assert!(matches!(
            parse_plaintext(dup),
            Err(StrongboxError::CorruptStore(_))
        ));
    }
}
