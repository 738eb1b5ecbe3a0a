//! `strongbox init`: create a new, empty store.

use crate::cli::output;
use crate::cli::{prompt_new_passphrase, AppContext, PASSPHRASE_ENV};
use crate::errors::{Result, StrongboxError};
use crate::vault::format::{read_store_file, StoreFile};
use crate::vault::initialize_store;

/// Execute the `init` command.
pub fn execute(ctx: &AppContext) -> Result<()> {
    // 1. Refuse to overwrite an existing store.
    if let StoreFile::Sealed(_) = read_store_file(&ctx.store_path)? {
        output::tip("Use `strongbox add` to add secrets to the existing store.");
        return Err(StrongboxError::StoreAlreadyExists(ctx.store_path.clone()));
    }

    // 2. Prompt for a new passphrase (with confirmation).
    let passphrase = prompt_new_passphrase(PASSPHRASE_ENV)?;

    // 3. Write the empty store.
    initialize_store(&ctx.store_path, &passphrase)?;
    ctx.forget_passphrase();

    output::success(&format!("Store created at {}", ctx.store_path.display()));
    output::tip("Run `strongbox add <NAME>` to add a secret.");
    output::tip("Run `strongbox list` to see all secrets.");

    Ok(())
}
