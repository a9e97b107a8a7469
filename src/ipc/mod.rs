//! IPC module for daemon-UI communication

mod protocol;
mod server;

pub use protocol::{Request, Response, StatusSnapshot};
pub use server::Server;
