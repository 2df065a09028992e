//! Hardware interface names and parameter keys.

/// Interface name for joint position.
pub const HW_IF_POSITION: &str = "position";

/// Interface name for joint velocity.
pub const HW_IF_VELOCITY: &str = "velocity";

/// Interface name for joint effort.
pub const HW_IF_EFFORT: &str = "effort";

/// Hardware parameter: startup duration in seconds.
pub const PARAM_START_DURATION: &str = "example_param_hw_start_duration_sec";

/// Hardware parameter: shutdown duration in seconds.
pub const PARAM_STOP_DURATION: &str = "example_param_hw_stop_duration_sec";

/// Hardware parameter: relaxation slowdown factor.
pub const PARAM_SLOWDOWN: &str = "example_param_hw_slowdown";

/// Hardware parameter: state source selection (`subscription` or `relaxation`).
pub const PARAM_STATE_SOURCE: &str = "state_source";
