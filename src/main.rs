//! lid-control-daemon: screen mode reconciliation for convertible laptops
//!
//! The daemon owns the mode/orientation/touch state machine and keeps the
//! physical devices consistent with it:
//! - ACPI hotkey polling for tablet/laptop form-factor changes
//! - fire-and-forget commands to the spin daemon's control socket
//! - touchscreen/touchpad switching via xinput
//! - on-screen keyboard process lifecycle
//! - IPC server for the tray/popup UI process

mod config;
mod controller;
mod events;
mod gateway;
mod hotkey;
mod inventory;
mod ipc;
mod lifecycle;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::controller::Controller;
use crate::events::StateNotification;
use crate::gateway::{OnScreenKeyboard, SpinGateway, XinputGateway, SPIN_SOCKET_PATH};
use crate::hotkey::{HotkeyListener, ACPI_SOCKET_PATH};
use crate::inventory::DeviceInventory;
use crate::ipc::Server;

#[derive(Debug, Parser)]
#[command(
    name = "lid-control-daemon",
    about = "Screen mode reconciliation daemon for convertible laptops",
    version
)]
struct Cli {
    /// Path to TOML config file
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // The env filter wins over the config-file verbosity
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "lid-control-daemon starting"
    );

    config.ensure_dirs()?;
    let pid_file = config.pid_file()?;
    lifecycle::write_pid_file(&pid_file)?;

    // Create channels for inter-component communication
    // Hotkey listener and IPC server -> controller
    let (input_tx, input_rx) = mpsc::channel(32);
    // Controller -> IPC server and subscribed UI clients
    let (notify_tx, _notify_rx) = broadcast::channel::<StateNotification>(64);

    // Probe input devices once; a failed probe degrades to no-op switching
    let inventory = DeviceInventory::probe().await;

    let mut controller = Controller::new(
        SpinGateway::new(SPIN_SOCKET_PATH),
        XinputGateway::new(inventory),
        OnScreenKeyboard::new(&config.keyboard.command),
        notify_tx.clone(),
    );

    // Start the hotkey listener (background poll task)
    let listener = HotkeyListener::new(ACPI_SOCKET_PATH, input_tx.clone());
    match listener.start().await {
        Ok(_handle) => {
            info!("hotkey listener started");
        }
        Err(e) => {
            error!(?e, "failed to start hotkey listener");
            warn!("continuing without hotkey support - is acpid running?");
        }
    }

    // Create the IPC server for UI clients
    let socket_path = config.socket_path()?;
    let server = Server::new(
        &socket_path,
        config.ui.icon_dir.clone(),
        input_tx.clone(),
        notify_tx.clone(),
    )?;

    // Subscribe to notifications to keep the server's read-model fresh
    let mut server_notify_rx = notify_tx.subscribe();

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the controller (processes hotkey events and UI intents)
        _ = controller.run(input_rx) => {
            info!("controller exited");
        }

        // Run the IPC server (accepts UI client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Mirror controller notifications into the server's snapshot
        _ = async {
            loop {
                match server_notify_rx.recv().await {
                    Ok(notification) => {
                        debug!(%notification, "state notification");
                        server.apply_notification(&notification).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "notification receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("notification handler exited");
        }

        // Wait for shutdown signal
        _ = lifecycle::wait_for_shutdown() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup: the keyboard helper is ours, never leave it running
    info!("shutting down...");

    controller.shutdown();
    server.shutdown().await;
    lifecycle::remove_pid_file(&pid_file);

    info!("lid-control-daemon stopped");

    Ok(())
}
