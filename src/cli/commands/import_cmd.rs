//! `strongbox import`: replace the store with another encrypted store,
//! or merge its secrets into the current one.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::prompt::InteractiveResolver;
use crate::cli::{
    env_passphrase, prompt_new_passphrase, prompt_passphrase, AppContext, IMPORT_PASSPHRASE_ENV,
    PASSPHRASE_ENV,
};
use crate::errors::{Result, StrongboxError};
use crate::merge::merge;
use crate::vault::format::{read_store_file, write_atomic, StoreFile};
use crate::vault::{load_store, save_store, SecretStore};

/// Execute the `import` command.
pub fn execute(ctx: &AppContext, file: &Path, merge_in: bool, use_store_passphrase: bool) -> Result<()> {
    if !file.is_file() {
        return Err(StrongboxError::CommandFailed(format!(
            "import file not found: {}",
            file.display()
        )));
    }

    if merge_in {
        merge_into_store(ctx, file, use_store_passphrase)
    } else {
        replace_store(ctx, file, use_store_passphrase)
    }
}

/// Validate `file` by decrypting it, then copy it over the store verbatim.
fn replace_store(ctx: &AppContext, file: &Path, use_store_passphrase: bool) -> Result<()> {
    let passphrase = if use_store_passphrase {
        ctx.unlock()?.1
    } else {
        import_passphrase()?
    };
    let imported = load_store(file, &passphrase)?;

    let bytes = fs::read(file)?;
    write_atomic(&ctx.store_path, &bytes)?;
    ctx.forget_passphrase();

    output::success(&format!(
        "Store replaced with {} ({} secrets)",
        file.display(),
        imported.len()
    ));
    Ok(())
}

/// Merge the secrets of `file` into the store, asking about conflicts.
fn merge_into_store(ctx: &AppContext, file: &Path, use_store_passphrase: bool) -> Result<()> {
    let (local, store_passphrase) = open_or_start_store(ctx)?;

    let imported = if use_store_passphrase {
        load_store(file, &store_passphrase)?
    } else {
        load_store(file, &import_passphrase()?)?
    };

    let outcome = merge(&local, &imported, &mut InteractiveResolver)?;
    save_store(&ctx.store_path, &store_passphrase, &outcome.store)?;

    let report = outcome.report;
    output::success(&format!(
        "Merged {} secrets ({} overwritten, {} skipped) from {}",
        report.imported,
        report.overwritten,
        report.skipped,
        file.display()
    ));
    if report.kept_local > 0 {
        output::info(&format!("{} conflicts kept the local version", report.kept_local));
    }
    Ok(())
}

/// Unlock the store, or start a new empty one if none exists yet.
fn open_or_start_store(ctx: &AppContext) -> Result<(SecretStore, Zeroizing<String>)> {
    if let StoreFile::Missing = read_store_file(&ctx.store_path)? {
        output::info(&format!(
            "No store at {}, a new one will be created.",
            ctx.store_path.display()
        ));
        let passphrase = prompt_new_passphrase(PASSPHRASE_ENV)?;
        return Ok((SecretStore::new(), passphrase));
    }
    ctx.unlock()
}

fn import_passphrase() -> Result<Zeroizing<String>> {
    match env_passphrase(IMPORT_PASSPHRASE_ENV) {
        Some(pw) => Ok(pw),
        None => prompt_passphrase("Enter passphrase of the import file"),
    }
}
