//! Hardware system trait and error types.
//!
//! This module defines:
//! - `SystemInterface` trait - Capability interface a host drives
//! - `HalError` enum - Error types for hardware operations

use crate::hal::config::HardwareInfo;
use crate::hal::interface::{CommandInterface, StateInterface};
use crate::hal::types::LifecycleStatus;
use std::time::Duration;
use thiserror::Error;

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// A joint does not declare exactly one command interface
    #[error("Joint '{joint}' has {found} command interfaces found. 1 expected.")]
    CommandInterfaceCount {
        /// Offending joint
        joint: String,
        /// Number of command interfaces declared
        found: usize,
    },

    /// A joint's command interface has the wrong kind
    #[error("Joint '{joint}' has '{found}' command interface. '{expected}' expected.")]
    CommandInterfaceKind {
        /// Offending joint
        joint: String,
        /// Declared interface name
        found: String,
        /// Required interface name
        expected: &'static str,
    },

    /// Two joints share a name
    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    /// More joints than a component can hold
    #[error("Too many joints: {found} (max {max})")]
    TooManyJoints {
        /// Number of joints described
        found: usize,
        /// Limit
        max: usize,
    },

    /// A hardware parameter is missing or invalid
    #[error("Parameter '{key}': {reason}")]
    Parameter {
        /// Parameter key
        key: String,
        /// What is wrong with it
        reason: String,
    },

    /// Operation not allowed in the current lifecycle state
    #[error("Cannot {operation} while {status}")]
    InvalidTransition {
        /// Requested operation
        operation: &'static str,
        /// Status at the time of the request
        status: LifecycleStatus,
    },

    /// Measurement subscription could not be opened
    #[error("Subscription error: {0}")]
    Subscription(String),
}

impl HalError {
    /// True for errors raised while validating a hardware description.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::CommandInterfaceCount { .. }
                | Self::CommandInterfaceKind { .. }
                | Self::DuplicateJoint(_)
                | Self::TooManyJoints { .. }
                | Self::Parameter { .. }
        )
    }
}

/// Capability interface of a hardware system component.
///
/// A host instantiates the component and drives it through this trait.
///
/// # Lifecycle
///
/// 1. `configure()` - once, validates the description and allocates state
/// 2. `export_*_interfaces()` - host collects the handles
/// 3. `start()` - opens the measurement path, seeds undefined values
/// 4. `read()` / `write()` - every control cycle
/// 5. `stop()` - once, releases the measurement path
///
/// # Timing Contracts
///
/// | Operation | RT Constraint |
/// |-----------|---------------|
/// | `configure()` / `start()` / `stop()` | None (outside RT loop) |
/// | `read()` / `write()` | **HARD**, never block |
pub trait SystemInterface: Send {
    /// Validate `info` and allocate the joint table and state mirror.
    ///
    /// # Errors
    /// Any configuration error leaves the component `Unconfigured`.
    fn configure(&mut self, info: &HardwareInfo) -> Result<(), HalError>;

    /// Read-only position and velocity handles for every joint.
    fn export_state_interfaces(&self) -> Vec<StateInterface>;

    /// Read-write position command handles for every joint.
    fn export_command_interfaces(&self) -> Vec<CommandInterface>;

    /// Move from `Configured` to `Started`.
    fn start(&mut self) -> Result<(), HalError>;

    /// Move from `Started` to `Stopped`.
    fn stop(&mut self) -> Result<(), HalError>;

    /// Refresh state for this control cycle.
    ///
    /// Exported state handles report the values captured here until the
    /// next `read()`. `period` is the time elapsed since the previous cycle.
    fn read(&mut self, period: Duration) -> Result<(), HalError>;

    /// Forward the current commands to the actuator.
    fn write(&mut self) -> Result<(), HalError>;

    /// Current lifecycle status.
    fn status(&self) -> LifecycleStatus;

    /// Component name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hal_error_display() {
        let err = HalError::CommandInterfaceCount {
            joint: "head_pan".to_string(),
            found: 2,
        };
        assert!(err.to_string().contains("head_pan"));
        assert!(err.to_string().contains("2 command interfaces"));

        let err = HalError::InvalidTransition {
            operation: "start",
            status: LifecycleStatus::Unconfigured,
        };
        assert_eq!(err.to_string(), "Cannot start while UNCONFIGURED");
    }

    #[test]
    fn test_hal_error_classification() {
        assert!(HalError::DuplicateJoint("j1".into()).is_configuration());
        assert!(!HalError::Subscription("spawn".into()).is_configuration());
    }
}
