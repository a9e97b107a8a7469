//! Configuration loading and management
//!
//! TOML file with every key optional; hardcoded defaults apply for anything
//! absent, including the whole file when no `-f` flag was given.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Daemon configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub logging: LoggingConfig,
    pub ui: UiConfig,
    pub daemon: DaemonConfig,
    pub keyboard: KeyboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log file path; stderr when absent
    pub file: Option<PathBuf>,
    /// Log verbosity, overridable via the env filter
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Directory UI clients resolve icon assets from
    pub icon_dir: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            icon_dir: PathBuf::from("/usr/share/lid-control/art"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Pid file path
    pub pid_file: Option<PathBuf>,
    /// IPC socket path for UI clients
    pub socket_path: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            pid_file: None,
            socket_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardConfig {
    /// On-screen keyboard command, spawned by path with no arguments
    pub command: PathBuf,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("/usr/bin/onboard"),
        }
    }
}

impl Config {
    /// Load configuration from the given file, or defaults when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Directory for runtime data
    pub fn data_dir(&self) -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("lid-control"))
    }

    /// Resolved IPC socket path
    pub fn socket_path(&self) -> Result<PathBuf> {
        match &self.daemon.socket_path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("daemon.sock")),
        }
    }

    /// Resolved pid file path
    pub fn pid_file(&self) -> Result<PathBuf> {
        match &self.daemon.pid_file {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("lid-control-daemon.pid")),
        }
    }

    /// Ensure the runtime data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.data_dir()?)?;
        Ok(())
    }
}
