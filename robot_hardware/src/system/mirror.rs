//! State mirror: per-joint position, velocity and command storage.
//!
//! The mirror is sized once at configure time and never resized, so the
//! handles handed out by `export_*_interfaces` stay valid for the lifetime of
//! the component. Two actors touch it concurrently:
//!
//! - the measurement path writes `(position, velocity)` pairs
//! - the control cycle reads them and owns the commands
//!
//! Each pair is written under its joint's lock, never field by field, and
//! becomes visible to state handles only when the control thread publishes
//! it at the start of a cycle.

use super::index::JointIndex;
use robot_common::hal::interface::{CommandInterface, JointCell, JointSample, StateInterface};
use robot_common::hal::types::{CommandFrame, InterfaceKind, JointStateMsg};
use std::sync::Arc;
use tracing::trace;

/// Outcome of applying one measurement message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Entries written to a slot
    pub applied: usize,
    /// Entries naming a joint this component does not control
    pub unknown: usize,
    /// Entries without a position value
    pub incomplete: usize,
}

/// Fixed-size set of joint cells indexed by slot.
#[derive(Debug)]
pub struct StateMirror {
    cells: Vec<Arc<JointCell>>,
}

impl StateMirror {
    /// Mirror of `len` joints, every value undefined.
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| Arc::new(JointCell::undefined())).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the mirror has no slot.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `slot`.
    pub fn cell(&self, slot: usize) -> Option<&Arc<JointCell>> {
        self.cells.get(slot)
    }

    /// Consistent `(position, velocity)` of `slot`.
    pub fn sample(&self, slot: usize) -> Option<JointSample> {
        self.cells.get(slot).map(|c| c.sample())
    }

    /// Pair of `slot` as seen by state handles.
    pub fn published(&self, slot: usize) -> Option<JointSample> {
        self.cells.get(slot).map(|c| c.published())
    }

    /// Snapshot every live pair for the state handles.
    pub fn publish(&self) {
        for cell in &self.cells {
            cell.publish();
        }
    }

    /// Command of `slot`.
    pub fn command(&self, slot: usize) -> Option<f64> {
        self.cells.get(slot).map(|c| c.command().get())
    }

    /// Overwrite positions and velocities from a measurement.
    ///
    /// Unknown names are skipped silently. Last write wins; there is no
    /// timestamp reconciliation. An entry without a velocity keeps the
    /// slot's previous velocity.
    pub fn apply(&self, index: &JointIndex, msg: &JointStateMsg) -> ApplyStats {
        let mut stats = ApplyStats::default();

        for (i, name) in msg.name.iter().enumerate() {
            let Some(slot) = index.slot(name) else {
                trace!("Ignoring joint state for unknown joint '{}'", name);
                stats.unknown += 1;
                continue;
            };
            let Some(&position) = msg.position.get(i) else {
                stats.incomplete += 1;
                continue;
            };
            let velocity = msg.velocity.get(i).copied();

            self.cells[slot].update_sample(|sample| {
                sample.position = position;
                if let Some(velocity) = velocity {
                    sample.velocity = velocity;
                }
            });
            trace!("Joint {} pos {:.5}", name, position);
            stats.applied += 1;
        }

        stats
    }

    /// Replace undefined values with defaults before the first cycle.
    ///
    /// Undefined position → 0 and its command → 0; undefined velocity → 0;
    /// a remaining undefined command holds the measured position. Returns the
    /// number of slots whose position was defaulted.
    pub fn seed_defaults(&self) -> usize {
        let mut seeded = 0;

        for cell in &self.cells {
            let mut position_undefined = false;
            cell.update_sample(|sample| {
                if sample.position.is_nan() {
                    sample.position = 0.0;
                    position_undefined = true;
                }
                if sample.velocity.is_nan() {
                    sample.velocity = 0.0;
                }
            });

            if position_undefined {
                cell.command().set(0.0);
                seeded += 1;
            } else if cell.command().get().is_nan() {
                cell.command().set(cell.sample().position);
            }
        }

        seeded
    }

    /// Copy every command into `frame` in slot order.
    pub fn fill_frame(&self, frame: &mut CommandFrame) {
        frame.clear();
        for cell in &self.cells {
            // Capacity equals MAX_JOINTS, which configure enforces.
            if frame.push(cell.command().get()).is_err() {
                break;
            }
        }
    }

    /// Position then velocity handle for every joint, in slot order.
    pub fn state_interfaces(&self, index: &JointIndex) -> Vec<StateInterface> {
        let mut interfaces = Vec::with_capacity(self.cells.len() * 2);
        for (name, cell) in index.names().iter().zip(&self.cells) {
            interfaces.push(StateInterface::new(
                name.clone(),
                InterfaceKind::Position,
                cell.clone(),
            ));
            interfaces.push(StateInterface::new(
                name.clone(),
                InterfaceKind::Velocity,
                cell.clone(),
            ));
        }
        interfaces
    }

    /// Position command handle for every joint, in slot order.
    pub fn command_interfaces(&self, index: &JointIndex) -> Vec<CommandInterface> {
        index
            .names()
            .iter()
            .zip(&self.cells)
            .map(|(name, cell)| {
                CommandInterface::new(name.clone(), InterfaceKind::Position, cell.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_common::hal::config::JointDescriptor;

    fn setup(names: &[&str]) -> (JointIndex, StateMirror) {
        let joints: Vec<_> = names.iter().map(|n| JointDescriptor::position_joint(n)).collect();
        let index = JointIndex::build(&joints);
        let mirror = StateMirror::new(index.len());
        (index, mirror)
    }

    #[test]
    fn new_mirror_is_undefined() {
        let (_, mirror) = setup(&["j1", "j2"]);
        assert_eq!(mirror.len(), 2);
        for slot in 0..2 {
            let sample = mirror.sample(slot).unwrap();
            assert!(sample.position.is_nan());
            assert!(sample.velocity.is_nan());
            assert!(mirror.command(slot).unwrap().is_nan());
        }
    }

    #[test]
    fn apply_updates_known_and_skips_unknown() {
        let (index, mirror) = setup(&["j1", "j2"]);
        let msg = JointStateMsg::from_triples([("j2", 0.5, 0.1), ("ghost", 9.0, 9.0)]);

        let stats = mirror.apply(&index, &msg);
        assert_eq!(
            stats,
            ApplyStats {
                applied: 1,
                unknown: 1,
                incomplete: 0
            }
        );
        assert_eq!(
            mirror.sample(1),
            Some(JointSample {
                position: 0.5,
                velocity: 0.1
            })
        );
        assert!(mirror.sample(0).unwrap().position.is_nan());
    }

    #[test]
    fn apply_without_velocity_keeps_previous() {
        let (index, mirror) = setup(&["j1"]);
        mirror.apply(&index, &JointStateMsg::from_triples([("j1", 1.0, 0.3)]));

        let msg = JointStateMsg {
            name: vec!["j1".into()],
            position: vec![2.0],
            velocity: vec![],
        };
        mirror.apply(&index, &msg);
        let sample = mirror.sample(0).unwrap();
        assert_eq!(sample.position, 2.0);
        assert_eq!(sample.velocity, 0.3);
    }

    #[test]
    fn apply_without_position_is_skipped() {
        let (index, mirror) = setup(&["j1"]);
        let msg = JointStateMsg {
            name: vec!["j1".into()],
            position: vec![],
            velocity: vec![1.0],
        };
        let stats = mirror.apply(&index, &msg);
        assert_eq!(stats.incomplete, 1);
        assert!(mirror.sample(0).unwrap().velocity.is_nan());
    }

    #[test]
    fn seed_defaults_zeroes_undefined() {
        let (index, mirror) = setup(&["j1", "j2"]);
        mirror.apply(&index, &JointStateMsg::from_triples([("j2", 0.7, 0.0)]));

        assert_eq!(mirror.seed_defaults(), 1);
        assert_eq!(mirror.sample(0).unwrap().position, 0.0);
        assert_eq!(mirror.command(0), Some(0.0));
        // Measured joint holds its position rather than jumping to zero.
        assert_eq!(mirror.sample(1).unwrap().position, 0.7);
        assert_eq!(mirror.command(1), Some(0.7));
    }

    #[test]
    fn handles_follow_publish_not_apply() {
        let (index, mirror) = setup(&["j1"]);
        let states = mirror.state_interfaces(&index);
        mirror.apply(&index, &JointStateMsg::from_triples([("j1", 1.0, 0.5)]));
        assert!(states[0].value().is_nan());

        mirror.publish();
        assert_eq!(states[0].value(), 1.0);
        assert_eq!(states[1].value(), 0.5);

        mirror.apply(&index, &JointStateMsg::from_triples([("j1", 2.0, 0.7)]));
        assert_eq!(mirror.published(0).unwrap().position, 1.0);
        assert_eq!(states[1].value(), 0.5);
    }

    #[test]
    fn fill_frame_in_slot_order() {
        let (_, mirror) = setup(&["j1", "j2", "j3"]);
        mirror.seed_defaults();
        mirror.cell(2).unwrap().command().set(1.5);

        let mut frame = CommandFrame::new();
        mirror.fill_frame(&mut frame);
        assert_eq!(&frame[..], &[0.0, 0.0, 1.5]);
    }

    #[test]
    fn interfaces_cover_every_joint() {
        let (index, mirror) = setup(&["j1", "j2"]);
        let states = mirror.state_interfaces(&index);
        let names: Vec<_> = states.iter().map(|s| s.full_name()).collect();
        assert_eq!(
            names,
            vec!["j1/position", "j1/velocity", "j2/position", "j2/velocity"]
        );

        let commands = mirror.command_interfaces(&index);
        assert_eq!(commands.len(), 2);
        commands[1].set_value(4.0);
        assert_eq!(mirror.command(1), Some(4.0));
    }
}
