//! Reconciliation controller module
//!
//! Holds the authoritative `ScreenControlState` and applies hotkey events
//! and UI intents as atomic transitions, driving the device gateways.

mod machine;
mod state;

pub use machine::{ControlInput, Controller};
pub use state::{DeviceMode, ScreenControlState, ScreenOrientation};
