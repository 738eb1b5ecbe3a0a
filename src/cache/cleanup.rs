//! Wipe the passphrase cache when the process is interrupted.
//!
//! The task runs next to the command on the tokio runtime.  On Ctrl-C
//! (or SIGTERM on Unix) it clears the cache through the same lock as
//! normal cache access and terminates the process.  When the command
//! finishes first, the caller aborts the task and nothing is wiped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::PassphraseCache;

/// Exit status used after an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Resolve once a termination request arrives.
pub async fn wait_for_termination() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        return tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        };
    }

    #[cfg(not(unix))]
    {
        return tokio::signal::ctrl_c().await;
    }
}

/// Clear the cache after a termination request.  Failures are logged only.
pub fn wipe_on_termination(cache: &PassphraseCache) {
    match cache.forget() {
        Ok(()) => info!("termination requested, passphrase cache cleared"),
        Err(e) => warn!(error = %e, "could not clear passphrase cache on termination"),
    }
}

/// Spawn the cleanup task.  Abort the returned handle once the command
/// has completed.
pub fn spawn_cleanup(cache: Arc<PassphraseCache>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = wait_for_termination().await {
            warn!(error = %e, "cannot listen for termination signals");
            return;
        }
        wipe_on_termination(&cache);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}
