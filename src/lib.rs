pub mod backup;
pub mod cache;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod merge;
pub mod vault;
