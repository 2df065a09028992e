//! Property tests for configuration and measurement handling.

use proptest::prelude::*;
use robot_common::hal::config::{HardwareInfo, InterfaceInfo, JointDescriptor};
use robot_common::hal::consts::{PARAM_SLOWDOWN, PARAM_START_DURATION, PARAM_STOP_DURATION};
use robot_common::hal::driver::SystemInterface;
use robot_common::hal::types::{InterfaceKind, JointStateMsg, LifecycleStatus};
use robot_common::consts::MAX_JOINTS;
use robot_hardware::JointStateSystem;
use std::collections::HashSet;

fn hardware_info(joints: &[String]) -> HardwareInfo {
    let mut info = HardwareInfo::default();
    for (key, value) in [
        (PARAM_START_DURATION, "0"),
        (PARAM_STOP_DURATION, "0"),
        (PARAM_SLOWDOWN, "10"),
    ] {
        info.hardware_parameters
            .insert(key.to_string(), value.to_string());
    }
    info.joints = joints
        .iter()
        .map(|n| JointDescriptor::position_joint(n))
        .collect();
    info
}

fn joint_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z][a-z0-9_]{0,7}", 1..MAX_JOINTS)
        .prop_map(|names| names.into_iter().collect())
}

fn configured(joints: &[String]) -> JointStateSystem {
    let mut system = JointStateSystem::builder().build();
    system
        .configure(&hardware_info(joints))
        .expect("configure");
    system
}

fn snapshot(system: &JointStateSystem, joints: &[String]) -> Vec<(u64, u64)> {
    joints
        .iter()
        .map(|j| {
            let s = system.sample(j).expect("known joint");
            (s.position.to_bits(), s.velocity.to_bits())
        })
        .collect()
}

proptest! {
    /// Every valid joint list configures and exports each joint exactly once
    #[test]
    fn valid_lists_export_each_joint_once(joints in joint_names()) {
        let system = configured(&joints);
        prop_assert_eq!(system.status(), LifecycleStatus::Configured);

        let states = system.export_state_interfaces();
        let commands = system.export_command_interfaces();
        prop_assert_eq!(commands.len(), joints.len());
        prop_assert_eq!(states.len(), joints.len() * 2);

        let command_names: HashSet<&str> = commands.iter().map(|c| c.prefix_name()).collect();
        prop_assert_eq!(command_names.len(), joints.len());
        for joint in &joints {
            prop_assert!(command_names.contains(joint.as_str()));
            for kind in [InterfaceKind::Position, InterfaceKind::Velocity] {
                let n = states
                    .iter()
                    .filter(|s| s.prefix_name() == joint && s.kind() == kind)
                    .count();
                prop_assert_eq!(n, 1);
            }
        }
    }

    /// A single bad command interface anywhere fails the whole configuration
    #[test]
    fn bad_command_interface_leaves_unconfigured(
        joints in joint_names(),
        pick in any::<prop::sample::Index>(),
        kind in prop_oneof![
            Just(None),
            Just(Some(InterfaceKind::Velocity)),
            Just(Some(InterfaceKind::Effort)),
        ],
    ) {
        let mut info = hardware_info(&joints);
        let bad = pick.index(joints.len());
        info.joints[bad].command_interfaces = kind.map(InterfaceInfo::of).into_iter().collect();

        let mut system = JointStateSystem::builder().build();
        prop_assert!(system.configure(&info).is_err());
        prop_assert_eq!(system.status(), LifecycleStatus::Unconfigured);
        prop_assert!(system.export_command_interfaces().is_empty());
    }

    /// Delivering a message twice equals delivering it once
    #[test]
    fn measurement_is_idempotent(
        joints in joint_names(),
        values in prop::collection::vec((-10.0..10.0f64, -5.0..5.0f64), MAX_JOINTS),
    ) {
        let system = configured(&joints);
        let msg = JointStateMsg::from_triples(
            joints.iter().zip(&values).map(|(n, &(p, v))| (n.as_str(), p, v)),
        );

        system.on_joint_states(&msg);
        let once = snapshot(&system, &joints);
        system.on_joint_states(&msg);
        prop_assert_eq!(once, snapshot(&system, &joints));
    }

    /// Unknown names change no slot and do not fail
    #[test]
    fn unknown_joints_change_nothing(
        joints in joint_names(),
        position in -10.0..10.0f64,
    ) {
        let system = configured(&joints);
        let before = snapshot(&system, &joints);

        // Uppercase names never match the generated lowercase ones.
        let stats = system.on_joint_states(&JointStateMsg::from_triples([
            ("UNKNOWN", position, 0.0),
            ("Ghost_1", position, 1.0),
        ]));
        prop_assert_eq!(stats.unknown, 2);
        prop_assert_eq!(before, snapshot(&system, &joints));
    }

    /// The later of two messages for the same joint wins
    #[test]
    fn last_write_wins(
        joints in joint_names(),
        first in (-10.0..10.0f64, -5.0..5.0f64),
        second in (-10.0..10.0f64, -5.0..5.0f64),
    ) {
        let mut system = configured(&joints);
        system.start().expect("start");
        let joint = joints[0].as_str();

        system.on_joint_states(&JointStateMsg::from_triples([(joint, first.0, first.1)]));
        system.on_joint_states(&JointStateMsg::from_triples([(joint, second.0, second.1)]));

        let sample = system.sample(joint).expect("known joint");
        prop_assert_eq!(sample.position, second.0);
        prop_assert_eq!(sample.velocity, second.1);
    }
}
