//! One module per subcommand.  Each exposes an `execute` function.

pub mod add;
pub mod backup;
pub mod change_master;
pub mod completions;
pub mod delete;
pub mod export;
pub mod generate;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod list_backups;
pub mod lock;
pub mod restore;
pub mod update;
