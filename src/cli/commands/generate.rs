//! `strongbox generate`: print a random passphrase.

use crate::crypto::generate_password;
use crate::errors::Result;

/// Execute the `generate` command.  Needs no store.
pub fn execute(length: usize, symbols: bool, digits: bool) -> Result<()> {
    let password = generate_password(length, symbols, digits)?;
    println!("{password}");
    Ok(())
}
