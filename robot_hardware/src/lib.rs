//! # Robot Hardware Library
//!
//! Joint-state hardware component and the host that drives it.
//!
//! The component implements `SystemInterface` from
//! `robot_common::hal::driver`: it maps named joints to fixed slots, mirrors
//! positions and velocities pushed by a measurement source, and forwards
//! position commands to an actuator every control cycle.
//!
//! # Module Structure
//!
//! - [`system`] - `JointStateSystem`, index builder, state mirror, subscription
//! - [`actuation`] - Actuator collaborators fed by `write()`
//! - [`fake`] - Fake joint driver echoing commands as measurements
//! - [`core`] - `HardwareHost`, fixed-rate read/write loop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     robot_hardware                               │
//! │  ┌──────────────┐    ┌──────────────────┐    ┌───────────────┐   │
//! │  │ HardwareHost │───►│ JointStateSystem │───►│   Actuator    │   │
//! │  │  (RT loop)   │    │  read()/write()  │    │ (collaborator)│   │
//! │  └──────────────┘    └────────▲─────────┘    └───────────────┘   │
//! │                               │ JointStateMsg                    │
//! │                      ┌────────┴─────────┐                        │
//! │                      │   Subscription   │◄── measurement feed    │
//! │                      └──────────────────┘                        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod actuation;
pub mod core;
pub mod fake;
pub mod system;

// Re-export key types for convenience
pub use crate::actuation::{Actuator, ChannelActuator, LoggingActuator};
pub use crate::core::{HardwareHost, TimingStats};
pub use crate::fake::FakeJointDriver;
pub use crate::system::{JointStateSystem, JointStateSystemBuilder};
