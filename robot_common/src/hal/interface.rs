//! Exported interface handles and the storage cells behind them.
//!
//! A hardware component owns one [`JointCell`] per joint slot. Handles are
//! cheap `Arc` clones of those cells, so they stay valid for as long as any
//! holder keeps them, independently of the component.
//!
//! Measured state is double-buffered. The measurement path writes the live
//! `(position, velocity)` pair under its lock; the control thread copies it
//! into the published snapshot once per cycle (`publish()`). State handles
//! only read the snapshot, so every read between two publishes sees the same
//! pair, even when position and velocity are read through separate handles.
//! The command is a lone `f64` stored as bits in an atomic.

use crate::hal::types::InterfaceKind;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Measured state of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSample {
    /// Position
    pub position: f64,
    /// Velocity
    pub velocity: f64,
}

impl JointSample {
    /// Sample with both fields undefined (NaN).
    pub const UNDEFINED: Self = Self {
        position: f64::NAN,
        velocity: f64::NAN,
    };
}

/// `f64` command slot readable and writable from any thread.
#[derive(Debug)]
pub struct CommandCell(AtomicU64);

impl CommandCell {
    /// New cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Current value.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Overwrite the value.
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Storage for one joint slot.
#[derive(Debug)]
pub struct JointCell {
    live: RwLock<JointSample>,
    published: RwLock<JointSample>,
    command: CommandCell,
}

impl JointCell {
    /// Cell with every value undefined (NaN).
    pub fn undefined() -> Self {
        Self {
            live: RwLock::new(JointSample::UNDEFINED),
            published: RwLock::new(JointSample::UNDEFINED),
            command: CommandCell::new(f64::NAN),
        }
    }

    /// Consistent copy of the latest measured pair.
    pub fn sample(&self) -> JointSample {
        *self.live.read()
    }

    /// Replace the measured pair as one unit.
    pub fn store_sample(&self, sample: JointSample) {
        *self.live.write() = sample;
    }

    /// Apply `f` to the measured pair under the write lock.
    pub fn update_sample<F: FnOnce(&mut JointSample)>(&self, f: F) {
        f(&mut *self.live.write());
    }

    /// Copy the latest measured pair into the snapshot seen by handles.
    ///
    /// Called from the control thread only.
    pub fn publish(&self) {
        let sample = self.sample();
        *self.published.write() = sample;
    }

    /// Pair as of the last `publish()`.
    pub fn published(&self) -> JointSample {
        *self.published.read()
    }

    /// Command slot.
    pub fn command(&self) -> &CommandCell {
        &self.command
    }
}

/// Read-only handle to a measured joint quantity.
#[derive(Debug, Clone)]
pub struct StateInterface {
    joint: Arc<str>,
    kind: InterfaceKind,
    cell: Arc<JointCell>,
}

impl StateInterface {
    /// Create a handle onto `cell`.
    ///
    /// Only `Position` and `Velocity` are backed by the cell; any other kind
    /// reads as NaN.
    pub fn new(joint: Arc<str>, kind: InterfaceKind, cell: Arc<JointCell>) -> Self {
        Self { joint, kind, cell }
    }

    /// Joint name.
    pub fn prefix_name(&self) -> &str {
        &self.joint
    }

    /// Interface name (`position`, `velocity`).
    pub fn interface_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Interface kind.
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// `<joint>/<interface>`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.joint, self.kind)
    }

    /// Value as of the last published cycle.
    pub fn value(&self) -> f64 {
        let sample = self.cell.published();
        match self.kind {
            InterfaceKind::Position => sample.position,
            InterfaceKind::Velocity => sample.velocity,
            InterfaceKind::Effort => f64::NAN,
        }
    }
}

/// Read-write handle to a joint command.
#[derive(Debug, Clone)]
pub struct CommandInterface {
    joint: Arc<str>,
    kind: InterfaceKind,
    cell: Arc<JointCell>,
}

impl CommandInterface {
    /// Create a handle onto the command slot of `cell`.
    pub fn new(joint: Arc<str>, kind: InterfaceKind, cell: Arc<JointCell>) -> Self {
        Self { joint, kind, cell }
    }

    /// Joint name.
    pub fn prefix_name(&self) -> &str {
        &self.joint
    }

    /// Interface name.
    pub fn interface_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Interface kind.
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// `<joint>/<interface>`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.joint, self.kind)
    }

    /// Current command.
    pub fn value(&self) -> f64 {
        self.cell.command().get()
    }

    /// Set the command.
    pub fn set_value(&self, value: f64) {
        self.cell.command().set(value);
    }
}
