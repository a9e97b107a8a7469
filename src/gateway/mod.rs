//! Device command gateway
//!
//! The only components permitted to issue commands to external device-control
//! mechanisms: the spin daemon socket, `xinput`, and the on-screen keyboard
//! process. All operations are send-only; delivery failure is logged and
//! never surfaced to the controller.
//!
//! The controller talks to the gateways through the narrow port traits below
//! so tests can substitute recording fakes.

mod input;
mod keyboard;
mod spin;

pub use input::XinputGateway;
pub use keyboard::OnScreenKeyboard;
pub use spin::{SpinGateway, SPIN_SOCKET_PATH};

use crate::controller::{DeviceMode, ScreenControlState, ScreenOrientation};

/// Commands toward the spin daemon's control socket
pub trait SpinPort {
    fn set_mode(&self, mode: DeviceMode);
    fn set_orientation(&self, orientation: ScreenOrientation);
    fn set_touch_enabled(&self, enabled: bool);
    fn set_rotation_lock(&self, locked: bool);

    /// Push the full desired configuration, always in the same order:
    /// mode, orientation, touch, rotation lock.
    fn set_state(&self, state: &ScreenControlState) {
        self.set_mode(state.mode);
        self.set_orientation(state.orientation);
        self.set_touch_enabled(state.enable_touch);
        self.set_rotation_lock(state.lock_rotation);
    }
}

/// Enable/disable switching of detected physical input devices
pub trait InputDevicePort {
    fn set_touchscreen_enabled(&self, enabled: bool);
    fn set_touchpad_enabled(&self, enabled: bool);
}

/// Lifecycle of the on-screen keyboard helper process
pub trait KeyboardPort {
    /// Start the helper; a no-op if it is already running
    fn start(&mut self);
    /// Terminate the helper; a no-op if it is not running
    fn stop(&mut self);
}
