//! `strongbox lock`: forget the cached passphrase.

use crate::cli::output;
use crate::cli::AppContext;
use crate::errors::Result;

/// Execute the `lock` command.
pub fn execute(ctx: &AppContext) -> Result<()> {
    ctx.cache.forget()?;
    output::success("Passphrase cache cleared");
    Ok(())
}
