//! Fire-and-forget command socket to the spin daemon
//!
//! The protocol is a bare ASCII token per datagram, no framing, no ack.
//! The daemon may simply not be running; a missing socket path is logged
//! and the command dropped.

use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::controller::{DeviceMode, ScreenOrientation};

use super::SpinPort;

/// Well-known control socket path of the spin daemon
pub const SPIN_SOCKET_PATH: &str = "/tmp/yoga_spin.socket";

/// Client side of the spin daemon's datagram control socket
pub struct SpinGateway {
    socket_path: PathBuf,
}

impl SpinGateway {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Send one literal command token, at-most-once
    fn send_command(&self, command: &str) {
        if !self.socket_path.exists() {
            error!(
                path = %self.socket_path.display(),
                command,
                "control socket does not exist, is the spin daemon running?"
            );
            return;
        }

        match send_datagram(&self.socket_path, command) {
            Ok(()) => debug!(command, "command sent to spin daemon"),
            Err(e) => error!(?e, command, "failed to send command to spin daemon"),
        }
    }
}

fn send_datagram(path: &Path, command: &str) -> std::io::Result<()> {
    let socket = UnixDatagram::unbound()?;
    socket.send_to(command.as_bytes(), path)?;
    Ok(())
}

impl SpinPort for SpinGateway {
    fn set_mode(&self, mode: DeviceMode) {
        self.send_command(mode.command_token());
    }

    fn set_orientation(&self, orientation: ScreenOrientation) {
        self.send_command(orientation.command_token());
    }

    fn set_touch_enabled(&self, enabled: bool) {
        self.send_command(if enabled { "touchenable" } else { "touchdisable" });
    }

    fn set_rotation_lock(&self, locked: bool) {
        self.send_command(if locked { "rotatelock" } else { "rotateunlock" });
    }
}
