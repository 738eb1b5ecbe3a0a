//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Two fixed parameter sets exist: one for the
//! master store key and a cheaper-memory one for the host-bound cache
//! key.  Neither is stored in any file, so they must never change for
//! existing stores to stay readable.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::keys::DerivedKey;
use crate::errors::{Result, StrongboxError};

/// Length of the store salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Static salt label mixed with the hostname to derive the cache key.
pub const CACHE_KEY_LABEL: &[u8] = b"strongbox-cache-key";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

/// Parameters for the master store key: 1 pass, 64 MiB, 4 lanes.
pub const STORE_PARAMS: Argon2Params = Argon2Params {
    memory_kib: 65_536,
    iterations: 1,
    parallelism: 4,
};

/// Parameters for the cache key: 3 passes, 32 MiB, 4 lanes.
pub const CACHE_PARAMS: Argon2Params = Argon2Params {
    memory_kib: 32_768,
    iterations: 3,
    parallelism: 4,
};

/// Derive a 32-byte key with explicit Argon2id parameters.
///
/// The same password + salt + params will always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<DerivedKey> {
    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| StrongboxError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = DerivedKey::zeroed();
    argon2
        .hash_password_into(password, salt, key.as_mut_bytes())
        .map_err(|e| StrongboxError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Derive the master key that protects a store file.
pub fn derive_store_key(passphrase: &str, salt: &[u8; SALT_LEN]) -> Result<DerivedKey> {
    derive_key(passphrase.as_bytes(), salt, &STORE_PARAMS)
}

/// Derive the host-bound key that protects the passphrase cache.
pub fn derive_cache_key(hostname: &str) -> Result<DerivedKey> {
    derive_key(hostname.as_bytes(), CACHE_KEY_LABEL, &CACHE_PARAMS)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
