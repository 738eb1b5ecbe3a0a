//! `strongbox list-backups`: show available backup archives.

use std::path::Path;

use crate::backup::list_backups;
use crate::cli::output;
use crate::cli::AppContext;
use crate::errors::Result;

/// Execute the `list-backups` command.
pub fn execute(ctx: &AppContext, dir: Option<&Path>) -> Result<()> {
    let backup_dir = dir.unwrap_or(ctx.backup_dir.as_path());
    let backups = list_backups(backup_dir)?;

    if backups.is_empty() {
        output::info(&format!("No backups in {}", backup_dir.display()));
        output::tip("Run `strongbox backup` to create one.");
        return Ok(());
    }

    output::info(&format!(
        "{} backup(s) in {}",
        backups.len(),
        backup_dir.display()
    ));
    output::print_backups_table(&backups);
    Ok(())
}
