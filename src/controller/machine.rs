//! Reconciliation controller
//!
//! Owns the authoritative `ScreenControlState`, applies hotkey events and UI
//! intents as transitions, and drives the gateways to keep physical devices
//! consistent with desired state. All mutation happens on the single task
//! running `run`, so no transition is ever observed half-applied.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::events::StateNotification;
use crate::gateway::{InputDevicePort, KeyboardPort, SpinPort};
use crate::hotkey::HotkeyEvent;

use super::state::{DeviceMode, ScreenControlState};

/// Everything the controller reacts to: decoded hotkey events plus the
/// intents the presentation layer forwards over IPC
#[derive(Debug, Clone)]
pub enum ControlInput {
    /// Hardware hotkey event from the ACPI listener
    Hotkey(HotkeyEvent),
    /// User flipped the touch switch in the popup
    ToggleTouch { enabled: bool },
    /// User flipped the rotation-lock switch in the popup
    ToggleRotationLock { locked: bool },
    /// User pressed the orientation cycle button
    CycleOrientation,
    /// User picked a Laptop/Tablet preset
    SubmitMode { mode: DeviceMode },
    /// The popup was closed via its close affordance (not hidden by us)
    PopupClosed,
    /// The tray icon was activated
    TrayActivated,
    /// The tray menu's "show" entry was activated
    TrayShowRequested,
}

/// The state machine reconciling desired state with the physical devices
pub struct Controller<S, D, K> {
    state: ScreenControlState,
    popup_visible: bool,
    spin: S,
    devices: D,
    keyboard: K,
    notify_tx: broadcast::Sender<StateNotification>,
}

impl<S, D, K> Controller<S, D, K>
where
    S: SpinPort,
    D: InputDevicePort,
    K: KeyboardPort,
{
    pub fn new(spin: S, devices: D, keyboard: K, notify_tx: broadcast::Sender<StateNotification>) -> Self {
        Self {
            state: ScreenControlState::default(),
            // The popup is shown at startup
            popup_visible: true,
            spin,
            devices,
            keyboard,
            notify_tx,
        }
    }

    /// Current desired configuration
    pub fn state(&self) -> ScreenControlState {
        self.state
    }

    /// Whether the popup is currently considered visible
    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    /// Run the controller, processing inputs until the channel closes
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<ControlInput>) {
        info!(state = ?self.state, "controller started");

        while let Some(input) = input_rx.recv().await {
            self.handle_input(input);
        }

        info!("controller stopped");
    }

    /// Apply one input as an atomic transition
    pub fn handle_input(&mut self, input: ControlInput) {
        match input {
            ControlInput::Hotkey(event) => self.handle_hotkey(event),
            ControlInput::ToggleTouch { enabled } => self.on_toggle_touch(enabled),
            ControlInput::ToggleRotationLock { locked } => self.on_toggle_rotation_lock(locked),
            ControlInput::CycleOrientation => self.on_cycle_orientation(),
            ControlInput::SubmitMode { mode } => self.on_submit_mode(mode),
            ControlInput::PopupClosed => self.on_popup_closed(),
            ControlInput::TrayActivated => self.on_tray_activated(),
            ControlInput::TrayShowRequested => self.on_tray_show_requested(),
        }
    }

    fn handle_hotkey(&mut self, event: HotkeyEvent) {
        match event {
            HotkeyEvent::TabletModeEntered => self.on_tablet_mode_entered(),
            HotkeyEvent::LaptopModeEntered => self.on_laptop_mode_entered(),
            HotkeyEvent::RotationLockToggled => {
                // Firmware handles the lock itself; nothing to reconcile
                debug!("rotation-lock hotkey observed");
            }
            HotkeyEvent::DisplayPositionChanged => {
                // Legacy ambiguous signal, superseded by the distinct
                // tablet/laptop events
                debug!("legacy display-position event ignored");
            }
            HotkeyEvent::Unknown(raw) => {
                debug!(payload = %raw, "unknown hotkey event ignored");
            }
        }
    }

    fn on_toggle_touch(&mut self, enabled: bool) {
        self.state.enable_touch = enabled;
        self.devices.set_touchscreen_enabled(enabled);
        debug!(enabled, "touch toggled");
        self.notify_state();
    }

    fn on_toggle_rotation_lock(&mut self, locked: bool) {
        // Advisory only: takes effect on the next mode submit
        self.state.lock_rotation = locked;
        debug!(locked, "rotation lock toggled");
        self.notify_state();
    }

    fn on_cycle_orientation(&mut self) {
        self.state.orientation = self.state.orientation.next();
        debug!(orientation = ?self.state.orientation, "orientation cycled");
        self.notify_state();
    }

    fn on_submit_mode(&mut self, mode: DeviceMode) {
        self.state.mode = mode;
        self.hide_popup();
        self.spin.set_state(&self.state);
        info!(%mode, "mode submitted");
        self.notify_state();
    }

    fn on_tablet_mode_entered(&mut self) {
        self.state.mode = DeviceMode::Tablet;
        self.keyboard.start();
        self.devices.set_touchpad_enabled(false);
        // Touch is forced on so the user can still operate the machine,
        // regardless of what the switch was set to before
        self.state.enable_touch = true;
        self.devices.set_touchscreen_enabled(true);
        info!("tablet mode entered");
        self.notify_state();
    }

    fn on_laptop_mode_entered(&mut self) {
        self.state.mode = DeviceMode::Laptop;
        self.keyboard.stop();
        self.devices.set_touchpad_enabled(true);
        info!("laptop mode entered");
        self.notify_state();
    }

    fn on_popup_closed(&mut self) {
        // Only the close affordance carries the keyboard side effect;
        // programmatic hides (mode submit, tray toggle) do not
        match self.state.mode {
            DeviceMode::Laptop => self.keyboard.stop(),
            DeviceMode::Tablet => self.keyboard.start(),
        }
        if self.popup_visible {
            self.popup_visible = false;
            self.notify_popup();
        }
    }

    fn on_tray_activated(&mut self) {
        self.popup_visible = !self.popup_visible;
        debug!(visible = self.popup_visible, "popup toggled from tray");
        self.notify_popup();
    }

    fn on_tray_show_requested(&mut self) {
        if !self.popup_visible {
            self.popup_visible = true;
            self.notify_popup();
        }
    }

    fn hide_popup(&mut self) {
        if self.popup_visible {
            self.popup_visible = false;
            self.notify_popup();
        }
    }

    fn notify_state(&self) {
        let _ = self.notify_tx.send(StateNotification::StateChanged { state: self.state });
    }

    fn notify_popup(&self) {
        let _ = self.notify_tx.send(StateNotification::PopupVisibility {
            visible: self.popup_visible,
        });
    }

    /// Release owned resources on daemon shutdown
    ///
    /// The keyboard helper is a child we own; leaving it running after exit
    /// was a defect of the previous implementation.
    pub fn shutdown(&mut self) {
        self.keyboard.stop();
    }
}
