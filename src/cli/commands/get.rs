//! `strongbox get`: print a single secret's value.

use crate::cli::AppContext;
use crate::errors::{Result, StrongboxError};

/// Execute the `get` command.
pub fn execute(ctx: &AppContext, name: &str) -> Result<()> {
    let (store, _passphrase) = ctx.unlock()?;

    let entry = store
        .get(name)
        .ok_or_else(|| StrongboxError::SecretNotFound(name.to_string()))?;
    println!("{}", entry.value);

    Ok(())
}
