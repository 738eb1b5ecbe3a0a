//! `strongbox export`: copy the encrypted store into a directory.
//!
//! The file is copied as is; no passphrase is needed and nothing is
//! decrypted.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::AppContext;
use crate::config::paths::STORE_FILE_NAME;
use crate::errors::Result;
use crate::vault::format::write_atomic;

/// Execute the `export` command.
pub fn execute(ctx: &AppContext, dir: &Path) -> Result<()> {
    ctx.require_store()?;

    let bytes = fs::read(&ctx.store_path)?;
    let target = dir.join(STORE_FILE_NAME);
    write_atomic(&target, &bytes)?;

    output::success(&format!("Store exported to {}", target.display()));
    Ok(())
}
