//! Vault module: encrypted secret storage.
//!
//! This module provides:
//! - The `SecretEntry` type (`secret`)
//! - Binary store file format and atomic writes (`format`)
//! - The `SecretStore` collection with load/save/initialize (`store`)

pub mod format;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use format::{EncryptedFile, StoreFile};
pub use secret::SecretEntry;
pub use store::{
    initialize_store, load_store, save_store, SecretStore, SecretUpdate, CURRENT_VERSION,
};
