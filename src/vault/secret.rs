//! The `SecretEntry` type stored inside a vault.
//!
//! Entries hold their plaintext value in memory; confidentiality at
//! rest comes from encrypting the whole store, not individual values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A single secret stored in the vault.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    /// The unique name of the secret (e.g. "github-token").
    pub name: String,

    /// The secret value.
    pub value: String,

    /// Free-form grouping label; may be empty.
    #[serde(default)]
    pub category: String,

    /// When this secret was first created.  Never changed by updates.
    pub created_at: DateTime<Utc>,
}

impl SecretEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(name: impl Into<String>, value: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            category: category.into(),
            created_at: Utc::now(),
        }
    }
}

impl Drop for SecretEntry {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

// Keep values out of logs and panic messages.
impl std::fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretEntry")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("category", &self.category)
            .field("created_at", &self.created_at)
            .finish()
    }
}
