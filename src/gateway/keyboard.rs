//! On-screen keyboard helper process
//!
//! Liveness is tracked only by the retained child handle: starting while
//! running and stopping while stopped are both no-ops. Termination is by
//! SIGTERM so the helper can exit cleanly.

use std::path::PathBuf;

use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use super::KeyboardPort;

/// Spawns and terminates the configured on-screen keyboard command
pub struct OnScreenKeyboard {
    command: PathBuf,
    child: Option<Child>,
}

impl OnScreenKeyboard {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            child: None,
        }
    }

    /// Whether a helper process is currently owned
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

impl KeyboardPort for OnScreenKeyboard {
    fn start(&mut self) {
        if self.child.is_some() {
            debug!("on-screen keyboard already running");
            return;
        }

        match Command::new(&self.command).spawn() {
            Ok(child) => {
                info!(pid = child.id(), command = %self.command.display(), "on-screen keyboard started");
                self.child = Some(child);
            }
            Err(e) => {
                error!(?e, command = %self.command.display(), "failed to start on-screen keyboard");
            }
        }
    }

    fn stop(&mut self) {
        let Some(child) = self.child.take() else {
            debug!("on-screen keyboard not running");
            return;
        };

        match child.id() {
            Some(pid) => {
                // SIGTERM rather than Child::kill's SIGKILL
                let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
                if rc == 0 {
                    info!(pid, "on-screen keyboard terminated");
                } else {
                    warn!(pid, "failed to deliver SIGTERM to on-screen keyboard");
                }
                // Dropping the handle lets the runtime reap the child
            }
            None => debug!("on-screen keyboard already exited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    /// A harmless long-running stand-in for the keyboard helper
    fn scratch_helper(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("fake-keyboard");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut keyboard = OnScreenKeyboard::new(scratch_helper(&dir));

        keyboard.start();
        assert!(keyboard.is_running());
        let pid = keyboard.child.as_ref().unwrap().id();

        // Second start must not respawn
        keyboard.start();
        assert_eq!(keyboard.child.as_ref().unwrap().id(), pid);

        keyboard.stop();
        assert!(!keyboard.is_running());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut keyboard = OnScreenKeyboard::new(scratch_helper(&dir));

        keyboard.stop();
        keyboard.stop();
        assert!(!keyboard.is_running());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_swallowed() {
        let mut keyboard = OnScreenKeyboard::new("/nonexistent/onboard");
        keyboard.start();
        assert!(!keyboard.is_running());
    }
}
