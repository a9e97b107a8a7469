//! Polling listener over the ACPI event socket
//!
//! A background task polls the stream socket every 50 ms with a non-blocking
//! read, classifies each newline-terminated payload, and forwards known
//! events to the controller's input channel. A poll fault is "no event this
//! tick", never fatal; the controller's scheduling loop is never blocked.

use std::path::PathBuf;
use std::time::Duration;

use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::ControlInput;

use super::decode::{classify, HotkeyEvent};

/// Well-known path of the ACPI event socket
pub const ACPI_SOCKET_PATH: &str = "/var/run/acpid.socket";

/// Poll cadence of the listener
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors that can occur starting the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("failed to connect to ACPI socket at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Listener over the platform hotkey channel
pub struct HotkeyListener {
    socket_path: PathBuf,
    input_tx: mpsc::Sender<ControlInput>,
}

impl HotkeyListener {
    pub fn new(socket_path: impl Into<PathBuf>, input_tx: mpsc::Sender<ControlInput>) -> Self {
        Self {
            socket_path: socket_path.into(),
            input_tx,
        }
    }

    /// Connect to the hotkey channel and spawn the poll task
    pub async fn start(self) -> Result<JoinHandle<()>, HotkeyError> {
        let stream =
            UnixStream::connect(&self.socket_path)
                .await
                .map_err(|source| HotkeyError::Connect {
                    path: self.socket_path.clone(),
                    source,
                })?;

        info!(path = %self.socket_path.display(), "hotkey listener connected");
        Ok(tokio::spawn(run_poll_loop(stream, self.input_tx)))
    }
}

async fn run_poll_loop(stream: UnixStream, input_tx: mpsc::Sender<ControlInput>) {
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut buf = [0u8; 4096];
    let mut eof_seen = false;

    loop {
        ticker.tick().await;

        let n = match stream.try_read(&mut buf) {
            // Zero bytes is "no event", even at peer EOF; keep polling
            Ok(0) => {
                if !eof_seen {
                    debug!("ACPI socket at EOF, continuing to poll");
                    eof_seen = true;
                }
                continue;
            }
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(e) => {
                // Treated as "no event this tick"
                debug!(?e, "poll fault on ACPI socket");
                continue;
            }
        };

        let payload = String::from_utf8_lossy(&buf[..n]);
        for line in payload.lines().filter(|line| !line.is_empty()) {
            match classify(line) {
                HotkeyEvent::Unknown(raw) => {
                    debug!(payload = %raw, "unknown ACPI event dropped");
                }
                event => {
                    debug!(?event, "hotkey event decoded");
                    if input_tx.send(ControlInput::Hotkey(event)).await.is_err() {
                        warn!("controller input channel closed, hotkey listener stopping");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixListener;
    use tokio::time::timeout;

    async fn listener_pair(
        dir: &tempfile::TempDir,
    ) -> (tokio::net::UnixStream, mpsc::Receiver<ControlInput>) {
        let path = dir.path().join("acpid.socket");
        let server = UnixListener::bind(&path).unwrap();
        let (input_tx, input_rx) = mpsc::channel(32);

        let listener = HotkeyListener::new(&path, input_tx);
        listener.start().await.unwrap();

        let (peer, _) = server.accept().await.unwrap();
        (peer, input_rx)
    }

    #[tokio::test]
    async fn test_known_payload_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut peer, mut input_rx) = listener_pair(&dir).await;

        peer.write_all(b"video/tabletmode TBLT 0000008A 00000001\n")
            .await
            .unwrap();

        let input = timeout(Duration::from_secs(1), input_rx.recv())
            .await
            .expect("no event within deadline")
            .unwrap();
        assert!(matches!(
            input,
            ControlInput::Hotkey(HotkeyEvent::TabletModeEntered)
        ));
    }

    #[tokio::test]
    async fn test_unknown_payload_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut peer, mut input_rx) = listener_pair(&dir).await;

        peer.write_all(b"button/power PBTN 00000080 00000000\n")
            .await
            .unwrap();
        peer.write_all(b"video/tabletmode TBLT 0000008A 00000000\n")
            .await
            .unwrap();

        // Only the recognized event comes through
        let input = timeout(Duration::from_secs(1), input_rx.recv())
            .await
            .expect("no event within deadline")
            .unwrap();
        assert!(matches!(
            input,
            ControlInput::Hotkey(HotkeyEvent::LaptopModeEntered)
        ));
    }

    #[tokio::test]
    async fn test_listener_survives_peer_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acpid.socket");
        let server = UnixListener::bind(&path).unwrap();
        let (input_tx, _input_rx) = mpsc::channel(32);

        let listener = HotkeyListener::new(&path, input_tx);
        let handle = listener.start().await.unwrap();

        let (peer, _) = server.accept().await.unwrap();
        drop(peer);

        // EOF is "no event this tick"; the poll task must keep running
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_connect_failure_reported() {
        let (input_tx, _input_rx) = mpsc::channel(32);
        let listener = HotkeyListener::new("/nonexistent/acpid.socket", input_tx);
        let result = listener.start().await;
        assert!(matches!(result, Err(HotkeyError::Connect { .. })));
    }
}
