//! System-wide constants for the joint-state hardware workspace.
//!
//! Single source of truth for numeric limits and default paths.

/// Maximum number of joints a single hardware component may expose.
pub const MAX_JOINTS: usize = 64;

/// Default control cycle time in microseconds (100 Hz = 10000 µs).
pub const CYCLE_TIME_US: u64 = 10_000;

/// Default hardware description path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/robot/robot.toml";

/// Topic the measurement source publishes joint states on.
pub const JOINT_STATES_TOPIC: &str = "/joint_states";

/// Queue depth of the joint-state subscription.
pub const JOINT_STATES_QUEUE_DEPTH: usize = 10;
