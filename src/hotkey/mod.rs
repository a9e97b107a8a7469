//! Hotkey module for the ACPI event channel
//!
//! Decodes raw ACPI payloads into a small closed set of semantic events and
//! feeds them to the controller without ever blocking its loop.

mod decode;
mod listener;

pub use decode::{classify, HotkeyEvent};
pub use listener::{HotkeyError, HotkeyListener, ACPI_SOCKET_PATH};
