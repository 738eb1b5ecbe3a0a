//! Merge an imported store into the local one.
//!
//! The result starts as a copy of the local entries.  Each imported
//! entry is either appended (no name clash) or handed to a
//! `ConflictResolver` together with the local entry of the same name.
//! Given a deterministic resolver the merge is deterministic; the CLI
//! plugs in an interactive resolver, tests plug in closures.

use crate::errors::Result;
use crate::vault::{SecretEntry, SecretStore};

/// What to do when both stores contain a secret with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the local entry.
    KeepLocal,
    /// Replace the local entry with the imported one.
    UseImported,
    /// Leave the local entry untouched without choosing either side.
    Skip,
}

/// Decides conflicts during a merge.
pub trait ConflictResolver {
    fn resolve(&mut self, local: &SecretEntry, imported: &SecretEntry) -> Result<Resolution>;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&SecretEntry, &SecretEntry) -> Resolution,
{
    fn resolve(&mut self, local: &SecretEntry, imported: &SecretEntry) -> Result<Resolution> {
        Ok(self(local, imported))
    }
}

/// Counts reported to the user after a merge.
///
/// `KeepLocal` and `Skip` have the same effect on the store; both count
/// as `skipped`, and `kept_local` records how many of those were an
/// explicit choice of the local version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries added from the imported store, including overwrites.
    pub imported: usize,
    /// Conflicts resolved in favour of the imported entry.
    pub overwritten: usize,
    /// Conflicts where the local entry was left as is.
    pub skipped: usize,
    /// Subset of `skipped` resolved with `KeepLocal`.
    pub kept_local: usize,
}

/// The merged store plus what happened to produce it.
#[derive(Debug)]
pub struct MergeOutcome {
    pub store: SecretStore,
    pub report: MergeReport,
}

/// Merge `imported` into a copy of `local`.
///
/// The result inherits `local.version`.  A resolver error aborts the
/// merge and leaves both inputs untouched.
pub fn merge<R>(local: &SecretStore, imported: &SecretStore, resolver: &mut R) -> Result<MergeOutcome>
where
    R: ConflictResolver + ?Sized,
{
    let mut merged: Vec<SecretEntry> = local.entries().to_vec();
    let mut report = MergeReport::default();

    for incoming in imported.entries() {
        let Some(existing) = local.get(&incoming.name) else {
            merged.push(incoming.clone());
            report.imported += 1;
            continue;
        };

        match resolver.resolve(existing, incoming)? {
            Resolution::UseImported => {
                merged.retain(|e| e.name != incoming.name);
                merged.push(incoming.clone());
                report.imported += 1;
                report.overwritten += 1;
            }
            Resolution::KeepLocal => {
                report.skipped += 1;
                report.kept_local += 1;
            }
            Resolution::Skip => {
                report.skipped += 1;
            }
        }
    }

    Ok(MergeOutcome {
        store: SecretStore::from_unique_entries(local.version, merged),
        report,
    })
}
