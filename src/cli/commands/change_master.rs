//! `strongbox change-master`: re-encrypt the store under a new passphrase.
//!
//! The salt of the existing file is kept; the key changes because the
//! passphrase does, and the save uses a fresh nonce.

use crate::cli::output;
use crate::cli::{prompt_new_passphrase, AppContext, NEW_PASSPHRASE_ENV};
use crate::errors::Result;
use crate::vault::save_store;

/// Execute the `change-master` command.
pub fn execute(ctx: &AppContext) -> Result<()> {
    // 1. Open the store with the current passphrase.
    output::info("Unlocking with the current master passphrase.");
    let (store, _old) = ctx.unlock()?;

    // 2. Prompt for the new passphrase.
    output::info("Choose the new master passphrase.");
    let new_passphrase = prompt_new_passphrase(NEW_PASSPHRASE_ENV)?;

    // 3. Save atomically and drop the stale cached passphrase.
    save_store(&ctx.store_path, &new_passphrase, &store)?;
    ctx.forget_passphrase();

    output::success(&format!(
        "Master passphrase changed ({} secrets re-encrypted)",
        store.len()
    ));

    Ok(())
}
