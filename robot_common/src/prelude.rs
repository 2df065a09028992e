//! Prelude module for common re-exports.
//!
//! ```rust
//! use robot_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, HostConfig, LogLevel, RobotConfig, SharedConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, MAX_JOINTS};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::config::{
    HardwareInfo, HardwareParams, InterfaceInfo, JointDescriptor, StateSourceKind,
};
pub use crate::hal::consts::{HW_IF_EFFORT, HW_IF_POSITION, HW_IF_VELOCITY};
pub use crate::hal::driver::{HalError, SystemInterface};
pub use crate::hal::interface::{CommandInterface, StateInterface};
pub use crate::hal::types::{CommandFrame, InterfaceKind, JointStateMsg, LifecycleStatus};

/// Default control cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(CYCLE_TIME_US);
