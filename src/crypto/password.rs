//! Random passphrase generation.

use rand::Rng;

use crate::errors::{Result, StrongboxError};

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+";

/// Default length used by `add --generate` and `generate`.
pub const DEFAULT_LENGTH: usize = 16;

/// Generate a random password of `length` characters.
///
/// Letters are always included; digits and symbols are opt-in.  Each
/// character is drawn uniformly from the combined alphabet.
pub fn generate_password(length: usize, symbols: bool, digits: bool) -> Result<String> {
    if length == 0 {
        return Err(StrongboxError::InvalidInput(
            "password length must be positive".into(),
        ));
    }

    let mut alphabet = String::from(LETTERS);
    if digits {
        alphabet.push_str(DIGITS);
    }
    if symbols {
        alphabet.push_str(SYMBOLS);
    }
    let alphabet = alphabet.as_bytes();

    let mut rng = rand::rng();
    let password = (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect();

    Ok(password)
}
