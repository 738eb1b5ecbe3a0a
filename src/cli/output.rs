//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::backup::BackupInfo;
use crate::vault::SecretEntry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of secrets (Name, Category, Created).  Values are never shown.
pub fn print_secrets_table<'a>(secrets: impl IntoIterator<Item = &'a SecretEntry>) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Category", "Created"]);

    let mut rows = 0;
    for s in secrets {
        table.add_row(vec![
            s.name.clone(),
            if s.category.is_empty() {
                "-".to_string()
            } else {
                s.category.clone()
            },
            s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
        rows += 1;
    }

    if rows == 0 {
        info("No secrets found.");
        tip("Run `strongbox add <NAME>` to add a secret.");
        return;
    }

    println!("{table}");
}

/// Print a table of backup archives (Name, Size, Modified, SHA-256).
pub fn print_backups_table(backups: &[BackupInfo]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Size", "Modified", "SHA-256"]);

    for b in backups {
        table.add_row(vec![
            b.name.clone(),
            format_size(b.size),
            b.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
            b.checksum
                .as_deref()
                .map(short_checksum)
                .unwrap_or("-")
                .to_string(),
        ]);
    }

    println!("{table}");
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn short_checksum(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
