//! Hardware description types.
//!
//! This module contains the configuration handed to a hardware component:
//! - `HardwareInfo` - Name, string parameters and joint list
//! - `JointDescriptor` - Per-joint declared interfaces
//! - `HardwareParams` - Typed view of the string parameters

use crate::consts::MAX_JOINTS;
use crate::hal::consts::{
    HW_IF_POSITION, PARAM_SLOWDOWN, PARAM_START_DURATION, PARAM_STATE_SOURCE,
    PARAM_STOP_DURATION,
};
use crate::hal::driver::HalError;
use crate::hal::types::InterfaceKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// A declared state or command interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Interface name (e.g. `position`)
    pub name: String,
}

impl InterfaceInfo {
    /// Interface of the given kind.
    pub fn of(kind: InterfaceKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
        }
    }

    /// Parsed kind, `None` for names outside the canonical set.
    pub fn kind(&self) -> Option<InterfaceKind> {
        InterfaceKind::from_name(&self.name)
    }
}

/// One joint as declared by the hardware description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescriptor {
    /// Joint name (unique within a component)
    pub name: String,

    /// Declared command interfaces
    #[serde(default)]
    pub command_interfaces: Vec<InterfaceInfo>,

    /// Declared state interfaces
    #[serde(default)]
    pub state_interfaces: Vec<InterfaceInfo>,
}

impl JointDescriptor {
    /// Joint commanded by position, reporting position and velocity.
    pub fn position_joint(name: &str) -> Self {
        Self {
            name: name.to_string(),
            command_interfaces: vec![InterfaceInfo::of(InterfaceKind::Position)],
            state_interfaces: vec![
                InterfaceInfo::of(InterfaceKind::Position),
                InterfaceInfo::of(InterfaceKind::Velocity),
            ],
        }
    }

    /// Validate the joint.
    ///
    /// # Validation Rules
    /// 1. Exactly one command interface
    /// 2. That interface is `position`
    pub fn validate(&self) -> Result<(), HalError> {
        if self.command_interfaces.len() != 1 {
            return Err(HalError::CommandInterfaceCount {
                joint: self.name.clone(),
                found: self.command_interfaces.len(),
            });
        }

        let command = &self.command_interfaces[0];
        if command.name != HW_IF_POSITION {
            return Err(HalError::CommandInterfaceKind {
                joint: self.name.clone(),
                found: command.name.clone(),
                expected: HW_IF_POSITION,
            });
        }

        Ok(())
    }

    /// Declared state interfaces this component does not back.
    pub fn unsupported_state_interfaces(&self) -> impl Iterator<Item = &InterfaceInfo> {
        self.state_interfaces.iter().filter(|i| {
            !matches!(
                i.kind(),
                Some(InterfaceKind::Position) | Some(InterfaceKind::Velocity)
            )
        })
    }
}

/// Hardware description passed to `configure()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// Component name
    pub name: String,

    /// String-valued hardware parameters
    #[serde(default, rename = "parameters")]
    pub hardware_parameters: HashMap<String, String>,

    /// Joints in slot order
    #[serde(default)]
    pub joints: Vec<JointDescriptor>,
}

impl HardwareInfo {
    /// Validate the joint list.
    ///
    /// # Validation Rules
    /// 1. `joints.len()` <= MAX_JOINTS
    /// 2. Every joint passes `JointDescriptor::validate`
    /// 3. Joint names unique
    pub fn validate_joints(&self) -> Result<(), HalError> {
        if self.joints.len() > MAX_JOINTS {
            return Err(HalError::TooManyJoints {
                found: self.joints.len(),
                max: MAX_JOINTS,
            });
        }

        let mut names = HashSet::with_capacity(self.joints.len());
        for joint in &self.joints {
            joint.validate()?;
            if !names.insert(joint.name.as_str()) {
                return Err(HalError::DuplicateJoint(joint.name.clone()));
            }
        }

        Ok(())
    }

    /// Raw parameter value.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.hardware_parameters.get(key).map(String::as_str)
    }
}

/// Where a component's measured state comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateSourceKind {
    /// Live measurements pushed through the subscription
    Subscription,
    /// Position relaxes toward command every read
    Relaxation,
}

impl StateSourceKind {
    fn parse(value: &str) -> Result<Self, HalError> {
        match value.trim() {
            "subscription" => Ok(Self::Subscription),
            "relaxation" => Ok(Self::Relaxation),
            other => Err(HalError::Parameter {
                key: PARAM_STATE_SOURCE.to_string(),
                reason: format!("unknown state source '{other}'"),
            }),
        }
    }
}

/// Typed hardware parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareParams {
    /// Time the hardware needs to start
    pub start_duration: Duration,
    /// Time the hardware needs to stop
    pub stop_duration: Duration,
    /// Relaxation damping factor
    pub slowdown: f64,
    /// Explicitly requested state source, `None` to choose automatically
    pub state_source: Option<StateSourceKind>,
}

impl HardwareParams {
    /// Parse the typed parameters out of `info`.
    ///
    /// The three timing/tuning parameters are required; `state_source` is
    /// optional. Durations must be finite and >= 0.
    pub fn from_info(info: &HardwareInfo) -> Result<Self, HalError> {
        let start_duration = parse_seconds(info, PARAM_START_DURATION)?;
        let stop_duration = parse_seconds(info, PARAM_STOP_DURATION)?;
        let slowdown = parse_f64(info, PARAM_SLOWDOWN)?;
        let state_source = info
            .parameter(PARAM_STATE_SOURCE)
            .map(StateSourceKind::parse)
            .transpose()?;

        Ok(Self {
            start_duration,
            stop_duration,
            slowdown,
            state_source,
        })
    }

    /// Check the slowdown factor is usable as a divisor.
    pub fn validate_slowdown(&self) -> Result<(), HalError> {
        if !self.slowdown.is_finite() || self.slowdown <= 0.0 {
            return Err(HalError::Parameter {
                key: PARAM_SLOWDOWN.to_string(),
                reason: format!("must be finite and > 0 (got {})", self.slowdown),
            });
        }
        Ok(())
    }
}

fn parse_f64(info: &HardwareInfo, key: &str) -> Result<f64, HalError> {
    let raw = info.parameter(key).ok_or_else(|| HalError::Parameter {
        key: key.to_string(),
        reason: "missing".to_string(),
    })?;

    raw.trim().parse::<f64>().map_err(|e| HalError::Parameter {
        key: key.to_string(),
        reason: format!("'{raw}' is not a number: {e}"),
    })
}

fn parse_seconds(info: &HardwareInfo, key: &str) -> Result<Duration, HalError> {
    let secs = parse_f64(info, key)?;
    Duration::try_from_secs_f64(secs).map_err(|e| HalError::Parameter {
        key: key.to_string(),
        reason: format!("invalid duration {secs}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with(params: &[(&str, &str)]) -> HardwareInfo {
        HardwareInfo {
            name: "test".to_string(),
            hardware_parameters: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            joints: vec![],
        }
    }

    fn timing_params() -> Vec<(&'static str, &'static str)> {
        vec![
            (PARAM_START_DURATION, "0"),
            (PARAM_STOP_DURATION, "3.0"),
            (PARAM_SLOWDOWN, "100"),
        ]
    }

    #[test]
    fn test_joint_validate_position_joint() {
        assert!(JointDescriptor::position_joint("j1").validate().is_ok());
    }

    #[test]
    fn test_joint_validate_missing_command_interface() {
        let mut joint = JointDescriptor::position_joint("j1");
        joint.command_interfaces.clear();
        assert_eq!(
            joint.validate(),
            Err(HalError::CommandInterfaceCount {
                joint: "j1".to_string(),
                found: 0
            })
        );
    }

    #[test]
    fn test_joint_validate_velocity_command_rejected() {
        let mut joint = JointDescriptor::position_joint("j1");
        joint.command_interfaces = vec![InterfaceInfo::of(InterfaceKind::Velocity)];
        assert!(matches!(
            joint.validate(),
            Err(HalError::CommandInterfaceKind { ref found, .. }) if found == "velocity"
        ));
    }

    #[test]
    fn test_unsupported_state_interfaces() {
        let mut joint = JointDescriptor::position_joint("j1");
        joint.state_interfaces.push(InterfaceInfo::of(InterfaceKind::Effort));
        let names: Vec<_> = joint
            .unsupported_state_interfaces()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["effort"]);
    }

    #[test]
    fn test_validate_joints_duplicate() {
        let mut info = info_with(&[]);
        info.joints = vec![
            JointDescriptor::position_joint("j1"),
            JointDescriptor::position_joint("j1"),
        ];
        assert_eq!(
            info.validate_joints(),
            Err(HalError::DuplicateJoint("j1".to_string()))
        );
    }

    #[test]
    fn test_validate_joints_too_many() {
        let mut info = info_with(&[]);
        info.joints = (0..=MAX_JOINTS)
            .map(|i| JointDescriptor::position_joint(&format!("j{i}")))
            .collect();
        assert!(matches!(
            info.validate_joints(),
            Err(HalError::TooManyJoints { .. })
        ));
    }

    #[test]
    fn test_params_parse() {
        let info = info_with(&timing_params());
        let params = HardwareParams::from_info(&info).unwrap();
        assert_eq!(params.start_duration, Duration::ZERO);
        assert_eq!(params.stop_duration, Duration::from_secs(3));
        assert_eq!(params.slowdown, 100.0);
        assert_eq!(params.state_source, None);
    }

    #[test]
    fn test_params_missing_key() {
        let info = info_with(&[(PARAM_START_DURATION, "0")]);
        let err = HardwareParams::from_info(&info).unwrap_err();
        assert!(matches!(err, HalError::Parameter { ref key, .. } if key == PARAM_STOP_DURATION));
    }

    #[test]
    fn test_params_not_a_number() {
        let mut params = timing_params();
        params[2] = (PARAM_SLOWDOWN, "fast");
        let err = HardwareParams::from_info(&info_with(&params)).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_params_negative_duration() {
        let mut params = timing_params();
        params[0] = (PARAM_START_DURATION, "-1");
        assert!(HardwareParams::from_info(&info_with(&params)).is_err());

        for raw in ["inf", "NaN"] {
            let mut params = timing_params();
            params[1] = (PARAM_STOP_DURATION, raw);
            assert!(matches!(
                HardwareParams::from_info(&info_with(&params)),
                Err(HalError::Parameter { ref key, .. }) if key == PARAM_STOP_DURATION
            ));
        }
    }

    #[test]
    fn test_params_state_source() {
        let mut params = timing_params();
        params.push((PARAM_STATE_SOURCE, "relaxation"));
        let parsed = HardwareParams::from_info(&info_with(&params)).unwrap();
        assert_eq!(parsed.state_source, Some(StateSourceKind::Relaxation));

        let mut params = timing_params();
        params.push((PARAM_STATE_SOURCE, "magic"));
        assert!(HardwareParams::from_info(&info_with(&params)).is_err());
    }

    #[test]
    fn test_validate_slowdown() {
        let mut params = HardwareParams::from_info(&info_with(&timing_params())).unwrap();
        assert!(params.validate_slowdown().is_ok());
        params.slowdown = 0.0;
        assert!(params.validate_slowdown().is_err());
        params.slowdown = f64::INFINITY;
        assert!(params.validate_slowdown().is_err());
    }

    #[test]
    fn test_hardware_info_from_toml() {
        let info: HardwareInfo = toml::from_str(
            r#"
name = "RobotHardware"

[parameters]
example_param_hw_slowdown = "100"

[[joints]]
name = "head_pan"
command_interfaces = [{ name = "position" }]
state_interfaces = [{ name = "position" }, { name = "velocity" }]
"#,
        )
        .unwrap();
        assert_eq!(info.parameter(PARAM_SLOWDOWN), Some("100"));
        assert_eq!(info.joints, vec![JointDescriptor::position_joint("head_pan")]);
    }
}
