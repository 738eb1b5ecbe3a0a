//! `strongbox add`: insert a new secret.

use crate::cli::output;
use crate::cli::{prompt_passphrase, AppContext};
use crate::crypto::generate_password;
use crate::errors::{Result, StrongboxError};
use crate::vault::{save_store, SecretEntry};

/// How the value of a new secret is obtained.
pub enum ValueSource {
    Given(String),
    Generated {
        length: usize,
        symbols: bool,
        digits: bool,
    },
    Prompt,
}

/// Execute the `add` command.
pub fn execute(ctx: &AppContext, name: &str, category: &str, source: ValueSource) -> Result<()> {
    let (mut store, passphrase) = ctx.unlock()?;

    // Fail on a duplicate before asking for (or generating) a value.
    if store.contains(name) {
        return Err(StrongboxError::SecretAlreadyExists(name.to_string()));
    }

    let generated = matches!(source, ValueSource::Generated { .. });
    let value = match source {
        ValueSource::Given(value) => value,
        ValueSource::Generated {
            length,
            symbols,
            digits,
        } => generate_password(length, symbols, digits)?,
        ValueSource::Prompt => prompt_passphrase(&format!("Value for '{name}'"))?.to_string(),
    };

    store.insert(SecretEntry::new(name, value, category))?;
    save_store(&ctx.store_path, &passphrase, &store)?;

    output::success(&format!("Added secret '{name}'"));
    if generated {
        output::tip(&format!("Run `strongbox get {name}` to see the generated value."));
    }

    Ok(())
}
