//! `strongbox backup`: archive the store directory.

use std::path::Path;

use crate::backup::create_backup;
use crate::cli::output;
use crate::cli::AppContext;
use crate::errors::Result;

/// Execute the `backup` command.
pub fn execute(ctx: &AppContext, dir: Option<&Path>) -> Result<()> {
    ctx.require_store()?;

    let backup_dir = dir.unwrap_or(ctx.backup_dir.as_path());
    let info = create_backup(&ctx.store_dir(), backup_dir)?;

    output::success(&format!(
        "Backup created: {} ({})",
        info.path.display(),
        output::format_size(info.size)
    ));
    if let Some(checksum) = &info.checksum {
        output::info(&format!("SHA-256: {checksum}"));
    }
    Ok(())
}
