//! Interactive conflict resolution for `import --merge`.

use console::style;
use dialoguer::Select;

use crate::errors::{Result, StrongboxError};
use crate::merge::{ConflictResolver, Resolution};
use crate::vault::SecretEntry;

const CHOICES: [(&str, Resolution); 3] = [
    ("Keep local", Resolution::KeepLocal),
    ("Use imported", Resolution::UseImported),
    ("Skip", Resolution::Skip),
];

/// Asks the user about every conflicting secret.
pub struct InteractiveResolver;

impl ConflictResolver for InteractiveResolver {
    fn resolve(&mut self, local: &SecretEntry, imported: &SecretEntry) -> Result<Resolution> {
        eprintln!(
            "{} secret '{}' exists in both stores",
            style("conflict:").yellow().bold(),
            local.name
        );
        eprintln!("  local:    {}", describe(local));
        eprintln!("  imported: {}", describe(imported));

        let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
        let picked = Select::new()
            .with_prompt("Resolve")
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|e| StrongboxError::CommandFailed(format!("conflict prompt: {e}")))?
            .ok_or(StrongboxError::UserCancelled)?;

        Ok(CHOICES[picked].1)
    }
}

/// Category and creation time; the value stays hidden.
fn describe(entry: &SecretEntry) -> String {
    let category = if entry.category.is_empty() {
        "-"
    } else {
        entry.category.as_str()
    };
    format!(
        "category={category}, created={}",
        entry.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}
