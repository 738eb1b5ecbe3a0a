//! `strongbox delete`: remove a secret from the store.

use crate::cli::output;
use crate::cli::{confirm, AppContext};
use crate::errors::Result;
use crate::vault::save_store;

/// Execute the `delete` command.
pub fn execute(ctx: &AppContext, name: &str, force: bool) -> Result<()> {
    let (mut store, passphrase) = ctx.unlock()?;

    // Fail on an unknown name before asking anything.
    store.remove(name)?;

    // Unless --force is set, ask for confirmation before saving.
    if !force && !confirm(&format!("Delete secret '{name}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    save_store(&ctx.store_path, &passphrase, &store)?;
    output::success(&format!("Deleted secret '{name}'"));

    Ok(())
}
