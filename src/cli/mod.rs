//! CLI module: Clap argument parser, passphrase handling, output helpers,
//! and command implementations.

pub mod commands;
pub mod output;
pub mod prompt;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::cache::{CacheConfig, PassphraseCache};
use crate::config::{paths, Settings};
use crate::errors::{Result, StrongboxError};
use crate::vault::format::{read_store_file, StoreFile};
use crate::vault::{load_store, SecretStore};

/// Minimum passphrase length to prevent trivially weak passphrases.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Master passphrase for scripted use.
pub const PASSPHRASE_ENV: &str = "STRONGBOX_PASSPHRASE";
/// New master passphrase for a scripted `change-master`.
pub const NEW_PASSPHRASE_ENV: &str = "STRONGBOX_NEW_PASSPHRASE";
/// Passphrase of the file given to `import`.
pub const IMPORT_PASSPHRASE_ENV: &str = "STRONGBOX_IMPORT_PASSPHRASE";

/// strongbox: local encrypted secret store.
#[derive(Parser)]
#[command(name = "strongbox", about = "Local encrypted secret store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the store file
    #[arg(long, env = "STRONGBOX_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, env = "STRONGBOX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty store
    Init,

    /// Add a secret
    Add {
        /// Secret name
        name: String,
        /// Secret value (omit for interactive prompt)
        #[arg(long, conflicts_with = "generate")]
        value: Option<String>,
        /// Category for organizing secrets
        #[arg(short, long, default_value = "")]
        category: String,
        /// Generate a random value
        #[arg(short, long)]
        generate: bool,
        /// Length of the generated value
        #[arg(short, long, default_value_t = crate::crypto::password::DEFAULT_LENGTH)]
        length: usize,
        /// Leave symbols out of the generated value
        #[arg(long)]
        no_symbols: bool,
        /// Leave digits out of the generated value
        #[arg(long)]
        no_digits: bool,
    },

    /// Print a secret's value
    Get {
        /// Secret name
        name: String,
    },

    /// List secrets
    List {
        /// Only show secrets in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Change a secret's value or category
    Update {
        /// Secret name
        name: String,
        /// New value (takes precedence over --generate)
        #[arg(long)]
        value: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// Replace the value with a generated one
        #[arg(short, long)]
        generate: bool,
        /// Length of the generated value
        #[arg(short, long, default_value_t = crate::crypto::password::DEFAULT_LENGTH)]
        length: usize,
    },

    /// Delete a secret
    Delete {
        /// Secret name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a random passphrase
    Generate {
        /// Number of characters
        #[arg(short, long, default_value_t = crate::crypto::password::DEFAULT_LENGTH)]
        length: usize,
        /// Include symbols
        #[arg(short, long)]
        symbols: bool,
        /// Include digits
        #[arg(short, long)]
        digits: bool,
    },

    /// Change the store's master passphrase
    ChangeMaster,

    /// Replace the store with, or merge in, another encrypted store
    Import {
        /// Encrypted store file to import
        file: PathBuf,
        /// Merge into the current store instead of replacing it
        #[arg(short, long)]
        merge: bool,
        /// The import file uses the same passphrase as the store
        #[arg(short = 'p', long)]
        use_store_passphrase: bool,
    },

    /// Copy the encrypted store into a directory
    Export {
        /// Destination directory
        dir: PathBuf,
    },

    /// Archive the store directory
    Backup {
        /// Backup directory (default: <store dir>/backups)
        dir: Option<PathBuf>,
    },

    /// Restore a backup archive
    Restore {
        /// Archive to restore (default: newest backup)
        archive: Option<PathBuf>,
        /// Directory to restore into (default: the store directory)
        target: Option<PathBuf>,
        /// Choose the archive from a list
        #[arg(short, long, conflicts_with = "archive")]
        interactive: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List backup archives
    ListBackups {
        /// Backup directory (default: <store dir>/backups)
        dir: Option<PathBuf>,
    },

    /// Forget the cached passphrase
    Lock,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Resolved paths and shared state for a single command.
pub struct AppContext {
    pub settings: Settings,
    pub store_path: PathBuf,
    pub backup_dir: PathBuf,
    pub cache: Arc<PassphraseCache>,
}

impl AppContext {
    /// Resolve config, store and backup locations from the command line.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(paths::default_config_path);
        let settings = Settings::load(&config_path)?;
        debug!(config = %config_path.display(), "settings loaded");

        let cache = PassphraseCache::new(CacheConfig::from_environment()?);
        Ok(Self::new(settings, cli.store.as_deref(), cache))
    }

    pub fn new(settings: Settings, store_override: Option<&Path>, cache: PassphraseCache) -> Self {
        let store_path = settings.resolve_store_path(store_override);
        let backup_dir = settings.resolve_backup_dir(&store_path);
        Self {
            settings,
            store_path,
            backup_dir,
            cache: Arc::new(cache),
        }
    }

    /// Directory holding the store file.
    pub fn store_dir(&self) -> PathBuf {
        crate::config::settings::store_dir(&self.store_path)
    }

    /// Fail unless a store file exists at the configured path.
    pub fn require_store(&self) -> Result<()> {
        if let StoreFile::Missing = read_store_file(&self.store_path)? {
            output::tip("Run `strongbox init` to create a store.");
            return Err(StrongboxError::CommandFailed(format!(
                "no store at {}",
                self.store_path.display()
            )));
        }
        Ok(())
    }

    /// Open the store, trying in order:
    /// 1. `STRONGBOX_PASSPHRASE` env var (CI/CD)
    /// 2. the passphrase cache
    /// 3. interactive prompt
    ///
    /// A passphrase typed at the prompt is cached after it unlocks the
    /// store.  Returns the passphrase so the caller can save.
    pub fn unlock(&self) -> Result<(SecretStore, Zeroizing<String>)> {
        self.require_store()?;

        if let Some(pw) = env_passphrase(PASSPHRASE_ENV) {
            let store = load_store(&self.store_path, &pw)?;
            return Ok((store, pw));
        }

        match self.cache.recall() {
            Ok(Some(pw)) => match load_store(&self.store_path, &pw) {
                Ok(store) => {
                    debug!("store unlocked with cached passphrase");
                    return Ok((store, pw));
                }
                Err(StrongboxError::InvalidPassphraseOrCorruptData) => {
                    warn!("cached passphrase no longer opens the store");
                    self.forget_passphrase();
                }
                Err(e) => return Err(e),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "passphrase cache unavailable"),
        }

        let pw = prompt_passphrase("Enter master passphrase")?;
        let store = load_store(&self.store_path, &pw)?;
        self.remember_passphrase(&pw);
        Ok((store, pw))
    }

    /// Cache `passphrase` for the configured TTL.  Failures are logged only.
    pub fn remember_passphrase(&self, passphrase: &str) {
        if let Err(e) = self.cache.remember(passphrase, self.settings.cache_ttl()) {
            warn!(error = %e, "could not cache passphrase");
        }
    }

    /// Clear the passphrase cache.  Failures are logged only.
    pub fn forget_passphrase(&self) {
        if let Err(e) = self.cache.forget() {
            warn!(error = %e, "could not clear passphrase cache");
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Read a non-empty passphrase from an environment variable.
pub fn env_passphrase(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Prompt for an existing passphrase.
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase(label: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(label)
        .interact()
        .map_err(|e| StrongboxError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation.
///
/// `env_var` is checked first for scripted use.  Enforces a minimum length.
pub fn prompt_new_passphrase(env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = env_passphrase(env_var) {
        validate_new_passphrase(&pw)?;
        return Ok(pw);
    }

    loop {
        let pw = dialoguer::Password::new()
            .with_prompt("Choose master passphrase")
            .with_confirmation(
                "Confirm master passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| StrongboxError::CommandFailed(format!("passphrase prompt: {e}")))?;

        match validate_new_passphrase(&pw) {
            Ok(()) => return Ok(pw),
            Err(e) => output::warning(&format!("{e}. Try again.")),
        }
    }
}

/// Reject passphrases shorter than the minimum length.
pub fn validate_new_passphrase(pw: &str) -> Result<()> {
    if pw.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(StrongboxError::InvalidInput(format!(
            "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
        )));
    }
    Ok(())
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(question: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(|e| StrongboxError::CommandFailed(format!("confirm prompt: {e}")))
}
