//! Compressed backups of the store directory.
//!
//! A backup is a gzip-compressed tar archive named
//! `backup_YYYYMMDD-HHMMSS.tar.gz` with a `sha256sum`-style sidecar
//! (`<archive>.sha256`) next to it.  Restores refuse an archive whose
//! sidecar does not match, and unpack into a staging directory before
//! renaming files into place.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tar::{Archive, Builder, EntryType};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::{Result, StrongboxError};
use crate::vault::format::{ensure_private_dir, write_atomic};

const ARCHIVE_PREFIX: &str = "backup_";
const ARCHIVE_SUFFIX: &str = ".tar.gz";
const CHECKSUM_SUFFIX: &str = ".sha256";

/// A backup archive on disk.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
    /// Hex SHA-256 from the sidecar, if one exists.
    pub checksum: Option<String>,
}

/// Archive every file under `source_dir` into `backup_dir`.
///
/// Anything inside `backup_dir` and leftover `.*.tmp` files or
/// directories are skipped.
pub fn create_backup(source_dir: &Path, backup_dir: &Path) -> Result<BackupInfo> {
    if !source_dir.is_dir() {
        return Err(StrongboxError::BackupFailed(format!(
            "source {} is not a directory",
            source_dir.display()
        )));
    }
    ensure_private_dir(backup_dir)?;

    let source = source_dir.canonicalize()?;
    let exclude = backup_dir.canonicalize()?;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);
    let mut files = 0usize;

    let walker = WalkDir::new(&source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !e.path().starts_with(&exclude) && (e.depth() == 0 || !is_temp_file(e.path()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| StrongboxError::BackupFailed(format!("walk: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(&source)
            .map_err(|e| StrongboxError::BackupFailed(e.to_string()))?;

        builder
            .append_path_with_name(entry.path(), rel)
            .map_err(|e| archive_error(entry.path(), e))?;
        debug!(file = %rel.display(), "added to backup");
        files += 1;
    }

    if files == 0 {
        return Err(StrongboxError::BackupFailed(format!(
            "nothing to back up in {}",
            source_dir.display()
        )));
    }

    let bytes = builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| StrongboxError::BackupFailed(format!("compress: {e}")))?;

    let path = next_archive_path(backup_dir);
    write_atomic(&path, &bytes)?;

    let checksum = hex::encode(Sha256::digest(&bytes));
    write_sidecar(&path, &checksum)?;

    info!(archive = %path.display(), files, "backup created");
    let mut info = backup_info(&path)?;
    info.checksum = Some(checksum);
    Ok(info)
}

/// Unpack `archive` into `target_dir` and return the number of files restored.
pub fn restore_backup(archive: &Path, target_dir: &Path) -> Result<usize> {
    let meta = match fs::metadata(archive) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StrongboxError::BackupFailed(format!(
                "backup {} not found",
                archive.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    if meta.len() == 0 {
        return Err(StrongboxError::BackupFailed(format!(
            "backup {} is empty",
            archive.display()
        )));
    }

    if let Some(expected) = read_sidecar(archive)? {
        let actual = file_checksum(archive)?;
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(StrongboxError::ChecksumMismatch {
                path: archive.to_path_buf(),
                expected,
                actual,
            });
        }
        debug!(archive = %archive.display(), "checksum verified");
    }

    ensure_private_dir(target_dir)?;

    // Files reach the target only by rename from the staging directory.
    let staging = target_dir.join(format!(".restore-{}.tmp", std::process::id()));
    let _ = fs::remove_dir_all(&staging);
    ensure_private_dir(&staging)?;

    let result = unpack_into(archive, &staging)
        .and_then(|restored| move_into_place(&staging, target_dir).map(|()| restored));
    if let Err(e) = fs::remove_dir_all(&staging) {
        debug!(dir = %staging.display(), error = %e, "could not remove staging directory");
    }
    let restored = result?;

    info!(archive = %archive.display(), target = %target_dir.display(), restored, "backup restored");
    Ok(restored)
}

fn unpack_into(archive: &Path, dir: &Path) -> Result<usize> {
    let mut tar = Archive::new(GzDecoder::new(File::open(archive)?));
    let mut restored = 0usize;

    for entry in tar.entries().map_err(|e| archive_error(archive, e))? {
        let mut entry = entry.map_err(|e| archive_error(archive, e))?;
        let is_file = entry.header().entry_type() == EntryType::Regular;
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let unpacked = entry
            .unpack_in(dir)
            .map_err(|e| archive_error(archive, e))?;
        if !unpacked {
            return Err(StrongboxError::BackupFailed(format!(
                "refusing entry outside the target directory: {name}"
            )));
        }
        if is_file {
            restored += 1;
        }
    }

    Ok(restored)
}

/// Rename every regular file under `staging` to the same relative path in `target_dir`.
fn move_into_place(staging: &Path, target_dir: &Path) -> Result<()> {
    for entry in WalkDir::new(staging).min_depth(1) {
        let entry = entry.map_err(|e| StrongboxError::BackupFailed(format!("walk: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(staging)
            .map_err(|e| StrongboxError::BackupFailed(e.to_string()))?;
        let dest = target_dir.join(rel);
        if let Some(parent) = dest.parent() {
            ensure_private_dir(parent)?;
        }
        fs::rename(entry.path(), &dest).map_err(|e| {
            StrongboxError::persistence(format!("rename into {}", dest.display()), e)
        })?;
        debug!(file = %rel.display(), "restored");
    }
    Ok(())
}

/// Backups in `dir`, newest first.  A missing directory has no backups.
pub fn list_backups(dir: &Path) -> Result<Vec<BackupInfo>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_archive = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(ARCHIVE_SUFFIX));
        if is_archive && path.is_file() {
            let mut info = backup_info(&path)?;
            info.checksum = read_sidecar(&path)?;
            backups.push(info);
        }
    }

    backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(backups)
}

/// Streaming SHA-256 of a file, lowercase hex.
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// `<archive>.sha256`
pub fn sidecar_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(CHECKSUM_SUFFIX);
    PathBuf::from(name)
}

fn write_sidecar(archive: &Path, checksum: &str) -> Result<()> {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    write_atomic(
        &sidecar_path(archive),
        format!("{checksum}  {file_name}\n").as_bytes(),
    )
}

fn read_sidecar(archive: &Path) -> Result<Option<String>> {
    match fs::read_to_string(sidecar_path(archive)) {
        Ok(text) => Ok(text.split_whitespace().next().map(str::to_string)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn backup_info(path: &Path) -> Result<BackupInfo> {
    let meta = fs::metadata(path)?;
    Ok(BackupInfo {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: meta.len(),
        modified: meta.modified().map(DateTime::<Local>::from)?,
        checksum: None,
    })
}

/// Timestamped archive path; a numeric suffix avoids clobbering a
/// backup taken in the same second.
fn next_archive_path(backup_dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let mut path = backup_dir.join(format!("{ARCHIVE_PREFIX}{stamp}{ARCHIVE_SUFFIX}"));
    let mut n = 1;
    while path.exists() {
        path = backup_dir.join(format!("{ARCHIVE_PREFIX}{stamp}-{n}{ARCHIVE_SUFFIX}"));
        n += 1;
    }
    path
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') && n.ends_with(".tmp"))
}

fn archive_error(path: &Path, e: std::io::Error) -> StrongboxError {
    StrongboxError::BackupFailed(format!("{}: {e}", path.display()))
}
