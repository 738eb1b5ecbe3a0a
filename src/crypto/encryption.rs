//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! returns it alongside the ciphertext.  The store file keeps the nonce
//! in its own fixed-width field; the passphrase cache uses `seal`/`open`,
//! which prepend the nonce to the ciphertext instead.
//!
//! Layout of a sealed buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, StrongboxError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns `(ciphertext_with_tag, nonce)`.  The nonce is drawn from the
/// OS random source on every call and must be stored next to the
/// ciphertext.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN])> {
    if key.len() != KEY_LEN {
        return Err(StrongboxError::EncryptionFailed(format!(
            "key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }

    // Build the cipher from the raw key bytes.
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| StrongboxError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // Encrypt and authenticate the plaintext.
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| StrongboxError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce.as_slice());
    Ok((ciphertext, nonce_bytes))
}

/// Decrypt `ciphertext` (with its appended tag) using `key` and `nonce`.
///
/// Every failure (wrong key or nonce, truncated or tampered data, bad
/// key length) collapses into `DecryptionFailed`.  No plaintext is
/// returned unless the tag verifies.
pub fn decrypt(key: &[u8], ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(StrongboxError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| StrongboxError::DecryptionFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StrongboxError::DecryptionFailed)
}

/// Encrypt and prepend the nonce so the caller only needs to store one blob.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let (ciphertext, nonce) = encrypt(key, plaintext)?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a blob produced by `seal`.
pub fn open(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(StrongboxError::DecryptionFailed);
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    decrypt(key, ciphertext, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ciphertext_carries_tag() {
        let key = [7u8; KEY_LEN];
        let (ct, _) = encrypt(&key, b"abc").unwrap();
        assert_eq!(ct.len(), 3 + TAG_LEN);
    }

    #[test]
    fn short_key_is_rejected() {
        let result = encrypt(&[1u8; 16], b"abc");
        assert!(matches!(result, Err(StrongboxError::EncryptionFailed(_))));
    }

    #[test]
    fn wrong_nonce_fails_closed() {
        let key = [9u8; KEY_LEN];
        let (ct, mut nonce) = encrypt(&key, b"payload").unwrap();
        nonce[0] ^= 0x01;
        assert!(matches!(
            decrypt(&key, &ct, &nonce),
            Err(StrongboxError::DecryptionFailed)
        ));
    }

    #[test]
    fn bad_key_length_on_decrypt_is_generic() {
        let key = [9u8; KEY_LEN];
        let (ct, nonce) = encrypt(&key, b"payload").unwrap();
        assert!(matches!(
            decrypt(&key[..31], &ct, &nonce),
            Err(StrongboxError::DecryptionFailed)
        ));
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = [3u8; KEY_LEN];
        let sealed = seal(&key, b"cached").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 6 + TAG_LEN);
        assert_eq!(open(&key, &sealed).unwrap(), b"cached");
    }

    #[test]
    fn open_rejects_short_blob() {
        let key = [3u8; KEY_LEN];
        assert!(open(&key, &[0u8; 4]).is_err());
    }
}
