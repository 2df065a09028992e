//! Robot Common Library
//!
//! This crate provides the shared types, constants and configuration loading
//! utilities used by the joint-state hardware workspace.
//!
//! # Module Structure
//!
//! - [`hal`] - Hardware description, interface handles and the system trait
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use robot_common::prelude::*;
//!
//! let joint = JointDescriptor::position_joint("head_pan");
//! assert_eq!(joint.command_interfaces[0].name, HW_IF_POSITION);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
