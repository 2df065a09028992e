//! Hardware data types.
//!
//! This module defines the data flowing through the hardware component:
//! - `InterfaceKind` - Which quantity an interface exposes
//! - `LifecycleStatus` - Component lifecycle state
//! - `JointStateMsg` - Inbound joint measurement
//! - `CommandFrame` - Per-tick commands handed to the actuator

use crate::consts::MAX_JOINTS;
use crate::hal::consts::{HW_IF_EFFORT, HW_IF_POSITION, HW_IF_VELOCITY};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity exposed by a state or command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    /// Joint position
    Position,
    /// Joint velocity
    Velocity,
    /// Joint effort
    Effort,
}

impl InterfaceKind {
    /// Canonical interface name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => HW_IF_POSITION,
            Self::Velocity => HW_IF_VELOCITY,
            Self::Effort => HW_IF_EFFORT,
        }
    }

    /// Parse a canonical interface name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            HW_IF_POSITION => Some(Self::Position),
            HW_IF_VELOCITY => Some(Self::Velocity),
            HW_IF_EFFORT => Some(Self::Effort),
            _ => None,
        }
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a hardware component.
///
/// Transitions only move forward:
/// `Unconfigured → Configured → Started → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleStatus {
    /// Not configured yet (or configuration failed)
    #[default]
    Unconfigured,
    /// Joint table built, mirror allocated
    Configured,
    /// Measurements flowing, read/write active
    Started,
    /// Terminal
    Stopped,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unconfigured => "UNCONFIGURED",
            Self::Configured => "CONFIGURED",
            Self::Started => "STARTED",
            Self::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

/// Joint measurement published by the measurement source.
///
/// The three sequences are parallel: entry `i` describes joint `name[i]`.
/// The source may report any subset of joints in any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStateMsg {
    /// Joint names
    pub name: Vec<String>,
    /// Positions, one per name
    pub position: Vec<f64>,
    /// Velocities, one per name
    pub velocity: Vec<f64>,
}

impl JointStateMsg {
    /// Build a message from `(name, position, velocity)` triples.
    pub fn from_triples<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64, f64)>,
    {
        let mut msg = Self::default();
        for (name, position, velocity) in entries {
            msg.name.push(name.to_string());
            msg.position.push(position);
            msg.velocity.push(velocity);
        }
        msg
    }

    /// Number of named entries.
    pub fn len(&self) -> usize {
        self.name.len()
    }

    /// True if the message names no joint.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Commands for every joint in slot order, handed to the actuator each tick.
pub type CommandFrame = heapless::Vec<f64, MAX_JOINTS>;
