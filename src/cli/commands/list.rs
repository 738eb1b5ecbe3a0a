//! `strongbox list`: display secrets in a table.

use crate::cli::output;
use crate::cli::AppContext;
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(ctx: &AppContext, category: Option<&str>) -> Result<()> {
    let (store, _passphrase) = ctx.unlock()?;

    match category {
        Some(category) => {
            let count = store.in_category(category).count();
            output::info(&format!("{count} secret(s) in category '{category}'"));
            output::print_secrets_table(store.in_category(category));
        }
        None => {
            output::info(&format!("{} secret(s)", store.len()));
            output::print_secrets_table(store.entries());
        }
    }

    Ok(())
}
