//! Cryptographic primitives for Strongbox.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - A zeroizing key holder (`keys`)
//! - Random passphrase generation (`password`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_store_key, ...};
pub use encryption::{decrypt, encrypt, open, seal};
pub use kdf::{derive_cache_key, derive_key, derive_store_key, generate_salt, Argon2Params};
pub use keys::DerivedKey;
pub use password::generate_password;
