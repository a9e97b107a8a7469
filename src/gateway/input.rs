//! Enable/disable switching of physical input devices via `xinput`
//!
//! Holds the inventory probed at startup; a role with no detected device
//! makes the corresponding switch a no-op.

use tokio::process::Command;
use tracing::{debug, error};

use crate::inventory::{DeviceInventory, DeviceRole};

use super::InputDevicePort;

/// `xinput`-backed input device switcher
pub struct XinputGateway {
    inventory: DeviceInventory,
}

impl XinputGateway {
    pub fn new(inventory: DeviceInventory) -> Self {
        Self { inventory }
    }

    /// Switch the device matched for `role`, if one was detected
    fn switch(&self, role: DeviceRole, enabled: bool) {
        let Some(device) = self.inventory.device(role) else {
            debug!(%role, "no device detected for role, switch unchanged");
            return;
        };

        let verb = if enabled { "enable" } else { "disable" };
        // Fire-and-forget: the runtime reaps the child, no output captured
        match Command::new("xinput").arg(verb).arg(device).spawn() {
            Ok(_) => debug!(%role, device, verb, "xinput switch issued"),
            Err(e) => error!(?e, %role, device, verb, "failed to run xinput"),
        }
    }
}

impl InputDevicePort for XinputGateway {
    fn set_touchscreen_enabled(&self, enabled: bool) {
        self.switch(DeviceRole::Touchscreen, enabled);
    }

    fn set_touchpad_enabled(&self, enabled: bool) {
        self.switch(DeviceRole::Touchpad, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_role_is_a_noop() {
        // Empty inventory: the switch must return before spawning anything,
        // so no runtime is needed here
        let gateway = XinputGateway::new(DeviceInventory::default());
        gateway.set_touchscreen_enabled(true);
        gateway.set_touchpad_enabled(false);
    }
}
