//! Hardware abstraction types.
//!
//! This module contains the hardware description, the exported interface
//! handles and the `SystemInterface` capability trait a host drives.

pub mod config;
pub mod consts;
pub mod driver;
pub mod interface;
pub mod types;
