//! `strongbox update`: change a secret's value and/or category.

use crate::cli::output;
use crate::cli::AppContext;
use crate::crypto::generate_password;
use crate::errors::{Result, StrongboxError};
use crate::vault::{save_store, SecretUpdate};

/// Execute the `update` command.
///
/// `value` takes precedence over `generate` when both are given.
pub fn execute(
    ctx: &AppContext,
    name: &str,
    value: Option<String>,
    category: Option<String>,
    generate: bool,
    length: usize,
) -> Result<()> {
    if value.is_none() && category.is_none() && !generate {
        return Err(StrongboxError::InvalidInput(
            "nothing to update: pass --value, --category or --generate".into(),
        ));
    }
    if value.is_some() && generate {
        output::warning("--value takes precedence over --generate");
    }

    let (mut store, passphrase) = ctx.unlock()?;

    let value = match value {
        Some(v) => Some(v),
        None if generate => Some(generate_password(length, true, true)?),
        None => None,
    };

    store.update(name, SecretUpdate { value, category })?;
    save_store(&ctx.store_path, &passphrase, &store)?;

    output::success(&format!("Updated secret '{name}'"));
    Ok(())
}
