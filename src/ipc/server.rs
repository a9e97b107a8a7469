//! Unix domain socket server for the presentation adapter
//!
//! The tray/popup UI connects here: request-response for status queries and
//! user intents, push notifications for subscribed connections. Mutating
//! requests are forwarded to the controller, which stays the sole owner of
//! the authoritative state; this server only keeps a read-model snapshot
//! refreshed from the notification stream.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::controller::{ControlInput, ScreenControlState};
use crate::events::StateNotification;

use super::protocol::{Request, Response, StatusSnapshot};

/// Upper bound on a single frame body
const MAX_FRAME_LEN: usize = 64 * 1024;

/// IPC server handling UI client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    intent_tx: mpsc::Sender<ControlInput>,
    notify_tx: broadcast::Sender<StateNotification>,
}

/// Read-model of the controller's state for status queries
struct ServerState {
    state: ScreenControlState,
    popup_visible: bool,
    icon_dir: PathBuf,
    start_time: std::time::Instant,
}

impl Server {
    /// Bind the IPC socket and create the server
    pub fn new(
        socket_path: &Path,
        icon_dir: PathBuf,
        intent_tx: mpsc::Sender<ControlInput>,
        notify_tx: broadcast::Sender<StateNotification>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only access
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            state: ScreenControlState::default(),
            popup_visible: true,
            icon_dir,
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            intent_tx,
            notify_tx,
        })
    }

    /// Refresh the read-model from a controller notification
    pub async fn apply_notification(&self, notification: &StateNotification) {
        let mut server_state = self.state.write().await;
        match notification {
            StateNotification::StateChanged { state } => {
                server_state.state = *state;
            }
            StateNotification::PopupVisibility { visible } => {
                server_state.popup_visible = *visible;
            }
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let intent_tx = self.intent_tx.clone();
                    let notify_rx = self.notify_tx.subscribe();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, intent_tx, notify_rx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        intent_tx: mpsc::Sender<ControlInput>,
        notify_rx: broadcast::Receiver<StateNotification>,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_LEN {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;
            debug!(?request, "received request");

            if matches!(request, Request::Subscribe) {
                Self::send_message(&mut stream, &Response::Subscribed).await?;
                debug!("client subscribed to notifications");
                // The connection now carries only pushed notifications
                return Self::push_notifications(stream, notify_rx).await;
            }

            let response = Self::process_request(request, &state, &intent_tx).await;
            Self::send_message(&mut stream, &response).await?;
        }
    }

    /// Forward controller notifications to a subscribed client
    async fn push_notifications(
        mut stream: UnixStream,
        mut notify_rx: broadcast::Receiver<StateNotification>,
    ) -> Result<()> {
        loop {
            match notify_rx.recv().await {
                Ok(notification) => {
                    Self::send_message(&mut stream, &notification).await?;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "notification subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("notification channel closed");
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and build the response
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        intent_tx: &mpsc::Sender<ControlInput>,
    ) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let state = state.read().await;
                Response::Status(StatusSnapshot {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    state: state.state,
                    popup_visible: state.popup_visible,
                    icon_dir: state.icon_dir.clone(),
                    uptime_secs: state.start_time.elapsed().as_secs(),
                })
            }

            // Subscribe is intercepted in handle_client
            Request::Subscribe => Response::Subscribed,

            other => match other.into_input() {
                Some(input) => {
                    if intent_tx.send(input).await.is_err() {
                        error!("controller input channel closed");
                        Response::Error {
                            code: "controller_unavailable".to_string(),
                            message: "controller is not running".to_string(),
                        }
                    } else {
                        Response::Ack
                    }
                }
                None => Response::Error {
                    code: "unsupported".to_string(),
                    message: "request not supported".to_string(),
                },
            },
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DeviceMode;
    use std::time::Duration;
    use tokio::time::timeout;

    struct TestHarness {
        client: UnixStream,
        intent_rx: mpsc::Receiver<ControlInput>,
        notify_tx: broadcast::Sender<StateNotification>,
        _dir: tempfile::TempDir,
    }

    async fn start_server() -> TestHarness {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("daemon.sock");
        let (intent_tx, intent_rx) = mpsc::channel(32);
        let (notify_tx, _) = broadcast::channel(64);

        let server = Server::new(
            &socket_path,
            PathBuf::from("./art"),
            intent_tx,
            notify_tx.clone(),
        )
        .unwrap();
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let client = UnixStream::connect(&socket_path).await.unwrap();
        TestHarness {
            client,
            intent_rx,
            notify_tx,
            _dir: dir,
        }
    }

    async fn send_request(stream: &mut UnixStream, request: &Request) {
        let bytes = serde_json::to_vec(request).unwrap();
        stream
            .write_all(&(bytes.len() as u32).to_le_bytes())
            .await
            .unwrap();
        stream.write_all(&bytes).await.unwrap();
    }

    async fn read_frame<T: serde::de::DeserializeOwned>(stream: &mut UnixStream) -> T {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await.unwrap();
        let mut body = vec![0u8; u32::from_le_bytes(len_buf) as usize];
        stream.read_exact(&mut body).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let mut harness = start_server().await;
        send_request(&mut harness.client, &Request::Ping).await;
        let response: Response = read_frame(&mut harness.client).await;
        assert!(matches!(response, Response::Pong));
    }

    #[tokio::test]
    async fn test_intent_is_forwarded_and_acked() {
        let mut harness = start_server().await;
        send_request(
            &mut harness.client,
            &Request::SubmitMode {
                mode: DeviceMode::Tablet,
            },
        )
        .await;

        let response: Response = read_frame(&mut harness.client).await;
        assert!(matches!(response, Response::Ack));

        let input = timeout(Duration::from_secs(1), harness.intent_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            input,
            ControlInput::SubmitMode {
                mode: DeviceMode::Tablet
            }
        ));
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let mut harness = start_server().await;
        send_request(&mut harness.client, &Request::GetStatus).await;
        let response: Response = read_frame(&mut harness.client).await;

        match response {
            Response::Status(snapshot) => {
                assert_eq!(snapshot.state, ScreenControlState::default());
                assert!(snapshot.popup_visible);
                assert_eq!(snapshot.icon_dir, PathBuf::from("./art"));
            }
            other => panic!("expected status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscription_receives_pushed_notifications() {
        let mut harness = start_server().await;
        send_request(&mut harness.client, &Request::Subscribe).await;
        let response: Response = read_frame(&mut harness.client).await;
        assert!(matches!(response, Response::Subscribed));

        harness
            .notify_tx
            .send(StateNotification::PopupVisibility { visible: false })
            .unwrap();

        let pushed: StateNotification = timeout(
            Duration::from_secs(1),
            read_frame(&mut harness.client),
        )
        .await
        .unwrap();
        assert!(matches!(
            pushed,
            StateNotification::PopupVisibility { visible: false }
        ));
    }
}
