//! Notifications emitted by the controller toward the presentation layer
//!
//! The view (tray icon + popup) keeps its widgets consistent with the
//! authoritative state by consuming these over a broadcast channel; IPC
//! clients receive them as push messages after subscribing.

use serde::{Deserialize, Serialize};

use crate::controller::ScreenControlState;

/// State-change notifications emitted by the controller
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateNotification {
    /// The desired configuration changed; carries the full new record
    StateChanged { state: ScreenControlState },

    /// The popup window should be shown or hidden
    PopupVisibility { visible: bool },
}

impl std::fmt::Display for StateNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateNotification::StateChanged { state } => {
                write!(
                    f,
                    "STATE_CHANGED (mode={} touch={} lock={})",
                    state.mode, state.enable_touch, state.lock_rotation
                )
            }
            StateNotification::PopupVisibility { visible } => {
                write!(f, "POPUP_VISIBILITY ({})", visible)
            }
        }
    }
}
