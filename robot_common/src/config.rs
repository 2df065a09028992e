//! Robot description files.
//!
//! A robot hardware description is a single TOML file holding a `[shared]`
//! block, the `[host]` loop settings and the `[hardware]` description that is
//! handed to the component's `configure()`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use robot_common::config::{ConfigError, ConfigLoader, RobotConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RobotConfig::load(Path::new("config/robot.toml"))?;
//!     config.validate()?;
//!     println!("{} joints", config.hardware.joints.len());
//!     Ok(())
//! }
//! ```

use crate::consts::CYCLE_TIME_US;
use crate::hal::config::HardwareInfo;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure to load or accept a description file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Robot description not found")]
    FileNotFound,

    /// Unreadable file or malformed TOML.
    #[error("Cannot parse robot description: {0}")]
    ParseError(String),

    /// Well-formed but unusable values.
    #[error("Invalid robot description: {0}")]
    ValidationError(String),
}

/// Verbosity of the process log.
///
/// Written in lowercase in TOML (`log_level = "debug"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, per-message tracing.
    Trace,
    /// Per-cycle detail.
    Debug,
    /// Lifecycle transitions.
    #[default]
    Info,
    /// Rejected or suspicious input.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Process identity and logging.
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "robot_hardware"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Log verbosity, `info` when omitted.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name reported in the startup banner.
    pub service_name: String,
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_cycle_time_us() -> u64 {
    CYCLE_TIME_US
}

/// Settings of the fixed-rate loop that drives the hardware component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Control cycle time in microseconds.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u64,
}

impl HostConfig {
    /// Control cycle period.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(self.cycle_time_us)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: default_cycle_time_us(),
        }
    }
}

/// Complete contents of a robot hardware description file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Shared logging/identity block.
    pub shared: SharedConfig,

    /// Host loop settings, defaults when the table is absent.
    #[serde(default)]
    pub host: HostConfig,

    /// Hardware description passed to `configure()`.
    pub hardware: HardwareInfo,
}

impl RobotConfig {
    /// Validate the parts that do not depend on the component.
    ///
    /// Joint-level rules are checked by the component at configure time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.host.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "host.cycle_time_us must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for any deserializable description type.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    ///
    /// A missing file is `FileNotFound`; any other I/O or TOML failure is
    /// `ParseError`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound,
            _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
        })?;

        Self::from_toml(&text)
    }

    /// Parse an in-memory TOML document.
    fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
