//! Joint name ↔ slot table.
//!
//! Built once from a validated joint list; immutable afterwards. Lookups on
//! the measurement path are a single `HashMap` probe.

use robot_common::hal::config::JointDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// Bijective mapping between joint names and mirror slots.
#[derive(Debug, Clone, Default)]
pub struct JointIndex {
    names: Vec<Arc<str>>,
    slots: HashMap<Arc<str>, usize>,
}

impl JointIndex {
    /// Assign slots in descriptor order starting at 0.
    ///
    /// Callers validate uniqueness first; a repeated name here would break
    /// the bijection, so it is treated as an invariant.
    pub fn build(joints: &[JointDescriptor]) -> Self {
        let names: Vec<Arc<str>> = joints.iter().map(|j| Arc::from(j.name.as_str())).collect();
        let slots: HashMap<Arc<str>, usize> = names
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.clone(), slot))
            .collect();
        debug_assert_eq!(names.len(), slots.len(), "joint names must be unique");

        Self { names, slots }
    }

    /// Slot of `name`, if this component controls it.
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Name at `slot`.
    pub fn name(&self, slot: usize) -> Option<&Arc<str>> {
        self.names.get(slot)
    }

    /// Joint names in slot order.
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no joint is configured.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
