//! `strongbox restore`: unpack a backup archive.

use std::path::{Path, PathBuf};

use dialoguer::Select;

use crate::backup::{list_backups, restore_backup, BackupInfo};
use crate::cli::output;
use crate::cli::{confirm, AppContext};
use crate::errors::{Result, StrongboxError};

/// Execute the `restore` command.
///
/// Without an explicit archive the newest backup is used, or the user
/// picks one when `interactive` is set.
pub fn execute(
    ctx: &AppContext,
    archive: Option<&Path>,
    target: Option<&Path>,
    interactive: bool,
    force: bool,
) -> Result<()> {
    let archive = match archive {
        Some(path) => path.to_path_buf(),
        None => pick_backup(&ctx.backup_dir, interactive)?,
    };
    let target = target.map(Path::to_path_buf).unwrap_or_else(|| ctx.store_dir());

    output::info(&format!("Backup:     {}", archive.display()));
    output::info(&format!("Restore to: {}", target.display()));

    if !force {
        output::warning("Existing files in the target directory will be overwritten.");
        if !confirm("Continue?")? {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let restored = restore_backup(&archive, &target)?;
    // The restored store may use a different passphrase.
    ctx.forget_passphrase();

    output::success(&format!(
        "Restored {restored} file(s) to {}",
        target.display()
    ));
    Ok(())
}

fn pick_backup(backup_dir: &Path, interactive: bool) -> Result<PathBuf> {
    let backups = list_backups(backup_dir)?;
    if backups.is_empty() {
        return Err(StrongboxError::BackupFailed(format!(
            "no backups found in {}",
            backup_dir.display()
        )));
    }

    if !interactive {
        return Ok(backups[0].path.clone());
    }

    let items: Vec<String> = backups.iter().map(describe).collect();
    let picked = Select::new()
        .with_prompt("Select backup to restore")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| StrongboxError::CommandFailed(format!("backup selection: {e}")))?
        .ok_or(StrongboxError::UserCancelled)?;

    Ok(backups[picked].path.clone())
}

fn describe(b: &BackupInfo) -> String {
    format!(
        "{:<35}  {:>10}  {}",
        b.name,
        output::format_size(b.size),
        b.modified.format("%Y-%m-%d %H:%M:%S")
    )
}
