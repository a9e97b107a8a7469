//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. Request/response clients and notification subscribers use
//! separate connections: after `Subscribe` is acknowledged the connection
//! carries only pushed `StateNotification` frames.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::controller::{ControlInput, DeviceMode, ScreenControlState};

/// Requests from the tray/popup UI to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request the current status snapshot
    GetStatus,

    /// The touch switch was flipped
    ToggleTouch { enabled: bool },

    /// The rotation-lock switch was flipped
    ToggleRotationLock { locked: bool },

    /// The orientation cycle button was pressed
    CycleOrientation,

    /// A Laptop/Tablet preset was picked
    SubmitMode { mode: DeviceMode },

    /// The popup was closed via its close affordance
    PopupClosed,

    /// The tray icon was activated
    TrayActivated,

    /// The tray menu's "show" entry was activated
    ShowPopup,

    /// Ping to check connectivity
    Ping,

    /// Subscribe this connection to state notifications
    Subscribe,
}

impl Request {
    /// The controller input this request maps to, if it mutates state
    pub fn into_input(self) -> Option<ControlInput> {
        match self {
            Request::ToggleTouch { enabled } => Some(ControlInput::ToggleTouch { enabled }),
            Request::ToggleRotationLock { locked } => {
                Some(ControlInput::ToggleRotationLock { locked })
            }
            Request::CycleOrientation => Some(ControlInput::CycleOrientation),
            Request::SubmitMode { mode } => Some(ControlInput::SubmitMode { mode }),
            Request::PopupClosed => Some(ControlInput::PopupClosed),
            Request::TrayActivated => Some(ControlInput::TrayActivated),
            Request::ShowPopup => Some(ControlInput::TrayShowRequested),
            Request::GetStatus | Request::Ping | Request::Subscribe => None,
        }
    }
}

/// Responses from the daemon to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(StatusSnapshot),

    /// Intent accepted and forwarded to the controller
    Ack,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed; notification frames follow
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Daemon version
    pub version: String,

    /// Current desired configuration
    pub state: ScreenControlState,

    /// Whether the popup should currently be visible
    pub popup_visible: bool,

    /// Directory the UI resolves its icon assets from
    pub icon_dir: PathBuf,

    /// Uptime in seconds
    pub uptime_secs: u64,
}
