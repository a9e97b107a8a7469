//! Input-device inventory
//!
//! Probes the available input devices once at startup by matching known
//! hardware names against the `xinput` listing. A role with no match means
//! "no such device on this machine" and every later switch request for it
//! becomes a silent no-op.

use tokio::process::Command;
use tracing::{debug, info, warn};

/// Logical input-device roles the daemon controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Touchscreen,
    Touchpad,
}

impl std::fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceRole::Touchscreen => write!(f, "touchscreen"),
            DeviceRole::Touchpad => write!(f, "touchpad"),
        }
    }
}

/// Known touchscreen device names, in match-priority order
const TOUCHSCREEN_NAMES: &[&str] = &[
    "ELAN Touchscreen",
    "Wacom Co.,Ltd. Pen and multitouch sensor Finger",
    "Atmel Atmel maXTouch Digitizer",
    "Raydium Touch System",
];

/// Known touchpad device names, in match-priority order
const TOUCHPAD_NAMES: &[&str] = &[
    "SynPS/2 Synaptics TouchPad",
    "Synaptics TM2668-002",
    "ELAN0676:00 04F3:3195 Touchpad",
];

/// Mapping from logical role to the detected physical device name
///
/// Built once at startup, read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct DeviceInventory {
    touchscreen: Option<String>,
    touchpad: Option<String>,
}

impl DeviceInventory {
    /// Probe the available input devices via `xinput`
    ///
    /// Never fails: a missing or erroring `xinput` degrades to an empty
    /// inventory, turning all device switching into no-ops.
    pub async fn probe() -> Self {
        let listing = match Command::new("xinput")
            .args(["list", "--name-only"])
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Ok(output) => {
                warn!(status = ?output.status, "xinput exited with failure, assuming no devices");
                String::new()
            }
            Err(e) => {
                warn!(?e, "failed to run xinput, assuming no devices");
                String::new()
            }
        };

        Self::from_listing(&listing)
    }

    /// Match known device names against a raw device listing
    pub fn from_listing(listing: &str) -> Self {
        let inventory = Self {
            touchscreen: find_first(listing, TOUCHSCREEN_NAMES),
            touchpad: find_first(listing, TOUCHPAD_NAMES),
        };

        for role in [DeviceRole::Touchscreen, DeviceRole::Touchpad] {
            match inventory.device(role) {
                Some(name) => info!(%role, device = name, "input device detected"),
                None => info!(%role, "input device not detected"),
            }
        }

        inventory
    }

    /// The detected device name for a role, if any
    pub fn device(&self, role: DeviceRole) -> Option<&str> {
        match role {
            DeviceRole::Touchscreen => self.touchscreen.as_deref(),
            DeviceRole::Touchpad => self.touchpad.as_deref(),
        }
    }
}

/// First candidate name appearing as a literal substring of the listing
fn find_first(listing: &str, candidates: &[&str]) -> Option<String> {
    let found = candidates
        .iter()
        .find(|name| listing.contains(**name))
        .map(|name| (*name).to_string());
    if found.is_none() {
        debug!(?candidates, "no candidate name present in listing");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_known_devices() {
        let listing = "Virtual core pointer\n\
                       ELAN Touchscreen\n\
                       SynPS/2 Synaptics TouchPad\n\
                       AT Translated Set 2 keyboard\n";
        let inventory = DeviceInventory::from_listing(listing);
        assert_eq!(
            inventory.device(DeviceRole::Touchscreen),
            Some("ELAN Touchscreen")
        );
        assert_eq!(
            inventory.device(DeviceRole::Touchpad),
            Some("SynPS/2 Synaptics TouchPad")
        );
    }

    #[test]
    fn test_first_candidate_wins() {
        // Both touchscreen candidates present; priority order decides
        let listing = "Raydium Touch System\nELAN Touchscreen\n";
        let inventory = DeviceInventory::from_listing(listing);
        assert_eq!(
            inventory.device(DeviceRole::Touchscreen),
            Some("ELAN Touchscreen")
        );
    }

    #[test]
    fn test_empty_listing_detects_nothing() {
        let inventory = DeviceInventory::from_listing("");
        assert_eq!(inventory.device(DeviceRole::Touchscreen), None);
        assert_eq!(inventory.device(DeviceRole::Touchpad), None);
    }

    #[test]
    fn test_unrelated_devices_ignored() {
        let listing = "Virtual core pointer\nUSB Optical Mouse\n";
        let inventory = DeviceInventory::from_listing(listing);
        assert_eq!(inventory.device(DeviceRole::Touchscreen), None);
        assert_eq!(inventory.device(DeviceRole::Touchpad), None);
    }
}
