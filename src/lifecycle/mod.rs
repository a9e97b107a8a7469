//! Daemon lifecycle: shutdown signals and the pid file

use std::path::Path;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, warn};

/// Wait until the daemon is told to exit (SIGTERM or SIGINT)
///
/// Failing to register a handler degrades to waiting on the other signal;
/// with neither available the daemon runs until killed.
pub async fn wait_for_shutdown() {
    let sigterm = signal(SignalKind::terminate());
    let sigint = signal(SignalKind::interrupt());

    match (sigterm, sigint) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => debug!("received SIGTERM"),
                _ = sigint.recv() => debug!("received SIGINT"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            warn!(?e, "failed to register SIGINT handler");
            sigterm.recv().await;
            debug!("received SIGTERM");
        }
        (Err(e), Ok(mut sigint)) => {
            warn!(?e, "failed to register SIGTERM handler");
            sigint.recv().await;
            debug!("received SIGINT");
        }
        (Err(e), Err(_)) => {
            error!(?e, "failed to register signal handlers, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Write the daemon's pid file, replacing any stale one
pub fn write_pid_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create pid file directory")?;
    }
    std::fs::write(path, format!("{}\n", std::process::id()))
        .with_context(|| format!("failed to write pid file {}", path.display()))?;
    debug!(path = %path.display(), pid = std::process::id(), "pid file written");
    Ok(())
}

/// Remove the pid file on the way out
pub fn remove_pid_file(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(?e, path = %path.display(), "failed to remove pid file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_wait_for_shutdown_observes_sigterm() {
        let waiter = tokio::spawn(wait_for_shutdown());
        // Let the handler register before raising the signal
        tokio::time::sleep(Duration::from_millis(50)).await;

        let rc = unsafe { libc::kill(std::process::id() as libc::pid_t, libc::SIGTERM) };
        assert_eq!(rc, 0);

        timeout(Duration::from_secs(2), waiter)
            .await
            .expect("shutdown wait did not observe SIGTERM")
            .unwrap();
    }

    #[test]
    fn test_pid_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("daemon.pid");

        write_pid_file(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());

        remove_pid_file(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_pid_file_is_a_noop() {
        remove_pid_file(Path::new("/nonexistent/daemon.pid"));
    }
}
