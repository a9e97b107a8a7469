//! The desired-configuration record and its value types
//!
//! `ScreenControlState` is the single source of truth for what the machine
//! should look like; physical devices are reconciled against it.

use serde::{Deserialize, Serialize};

/// Coarse form-factor preset the machine is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Clamshell: hardware keyboard and touchpad in use
    Laptop,
    /// Folded flat: touch-first, on-screen keyboard
    Tablet,
}

impl DeviceMode {
    /// Wire token understood by the spin daemon
    pub fn command_token(self) -> &'static str {
        match self {
            DeviceMode::Laptop => "laptop",
            DeviceMode::Tablet => "tablet",
        }
    }
}

impl Default for DeviceMode {
    fn default() -> Self {
        Self::Laptop
    }
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceMode::Laptop => write!(f, "Laptop"),
            DeviceMode::Tablet => write!(f, "Tablet"),
        }
    }
}

/// Display orientation as quarter-turns, cyclically ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenOrientation {
    Up,
    Right,
    Down,
    Left,
}

impl ScreenOrientation {
    /// Advance one quarter-turn, wrapping after `Left`
    pub fn next(self) -> Self {
        match self {
            ScreenOrientation::Up => ScreenOrientation::Right,
            ScreenOrientation::Right => ScreenOrientation::Down,
            ScreenOrientation::Down => ScreenOrientation::Left,
            ScreenOrientation::Left => ScreenOrientation::Up,
        }
    }

    /// Wire token understood by the spin daemon
    pub fn command_token(self) -> &'static str {
        match self {
            ScreenOrientation::Up => "normal",
            ScreenOrientation::Right => "right",
            ScreenOrientation::Down => "inverted",
            ScreenOrientation::Left => "left",
        }
    }
}

impl Default for ScreenOrientation {
    fn default() -> Self {
        Self::Up
    }
}

/// The authoritative desired configuration
///
/// Exactly one instance exists per process, owned by the controller; every
/// other component sees copies in notifications and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenControlState {
    /// Form-factor preset
    pub mode: DeviceMode,
    /// Manually selected display orientation
    pub orientation: ScreenOrientation,
    /// Suppress accelerometer-driven rotation
    pub lock_rotation: bool,
    /// Touchscreen input device active
    pub enable_touch: bool,
}

impl Default for ScreenControlState {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Laptop,
            orientation: ScreenOrientation::Up,
            lock_rotation: true,
            enable_touch: true,
        }
    }
}
