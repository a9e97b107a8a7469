//! Classification of raw ACPI payloads into semantic hotkey events
//!
//! Payloads are newline-terminated ASCII lines matched by exact equality
//! against a small fixed vocabulary. Anything else is `Unknown` and never
//! reaches the controller.

/// Tablet-mode switch engaged (screen folded flat)
const TABLET_MODE_EVENT: &str = "video/tabletmode TBLT 0000008A 00000001";
/// Tablet-mode switch released (back to clamshell)
const LAPTOP_MODE_EVENT: &str = "video/tabletmode TBLT 0000008A 00000000";
/// Rotation-lock hotkey; handled by firmware, decoded for completeness
const ROTATION_LOCK_EVENT: &str = "ibm/hotkey LEN0068:00 00000080 00006020";
/// Legacy ambiguous display-position hotkey from older firmware
const DISPLAY_POSITION_EVENT: &str = "ibm/hotkey LEN0068:00 00000080 000060c0";

/// Semantic hotkey events decoded from the ACPI channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The rotation-lock hardware key was pressed
    RotationLockToggled,
    /// Legacy ambiguous "display position changed" signal
    DisplayPositionChanged,
    /// The machine was folded into tablet form
    TabletModeEntered,
    /// The machine was unfolded into laptop form
    LaptopModeEntered,
    /// Unrecognized payload, logged and dropped
    Unknown(String),
}

/// Classify one newline-stripped payload line
pub fn classify(payload: &str) -> HotkeyEvent {
    match payload {
        TABLET_MODE_EVENT => HotkeyEvent::TabletModeEntered,
        LAPTOP_MODE_EVENT => HotkeyEvent::LaptopModeEntered,
        ROTATION_LOCK_EVENT => HotkeyEvent::RotationLockToggled,
        DISPLAY_POSITION_EVENT => HotkeyEvent::DisplayPositionChanged,
        other => HotkeyEvent::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vocabulary() {
        assert_eq!(
            classify("video/tabletmode TBLT 0000008A 00000001"),
            HotkeyEvent::TabletModeEntered
        );
        assert_eq!(
            classify("video/tabletmode TBLT 0000008A 00000000"),
            HotkeyEvent::LaptopModeEntered
        );
        assert_eq!(
            classify("ibm/hotkey LEN0068:00 00000080 00006020"),
            HotkeyEvent::RotationLockToggled
        );
        assert_eq!(
            classify("ibm/hotkey LEN0068:00 00000080 000060c0"),
            HotkeyEvent::DisplayPositionChanged
        );
    }

    #[test]
    fn test_unrecognized_payload_is_unknown() {
        let event = classify("button/power PBTN 00000080 00000000");
        assert_eq!(
            event,
            HotkeyEvent::Unknown("button/power PBTN 00000080 00000000".to_string())
        );
    }

    #[test]
    fn test_near_miss_is_unknown() {
        // Exact equality, not prefix matching
        let event = classify("video/tabletmode TBLT 0000008A 00000001 extra");
        assert!(matches!(event, HotkeyEvent::Unknown(_)));
    }
}
