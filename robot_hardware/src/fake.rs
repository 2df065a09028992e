//! Fake joint driver.
//!
//! Stands in for real actuators during development: it consumes the command
//! frames produced by a [`ChannelActuator`](crate::actuation::ChannelActuator),
//! pretends every joint reached its command instantly, and publishes the
//! result as joint-state measurements on the feed a component subscribes to.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use robot_common::hal::types::{CommandFrame, JointStateMsg};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Poll interval of the driver thread.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Echoes commands back as measurements on its own thread.
pub struct FakeJointDriver {
    is_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl FakeJointDriver {
    /// Spawn the driver thread.
    ///
    /// `joints` names the slots of incoming frames in order.
    pub fn spawn(
        joints: Vec<String>,
        commands: Receiver<CommandFrame>,
        states: Sender<JointStateMsg>,
    ) -> std::io::Result<Self> {
        let is_running = Arc::new(AtomicBool::new(true));
        let flag = is_running.clone();
        let thread = thread::Builder::new()
            .name("fake_joint_driver".to_string())
            .spawn(move || echo_loop(&joints, &commands, &states, &flag))?;

        Ok(Self {
            is_running,
            thread: Some(thread),
        })
    }

    /// Stop the thread; returns the number of measurements published.
    pub fn stop(&mut self) -> u64 {
        self.is_running.store(false, Ordering::Release);
        self.thread
            .take()
            .and_then(|t| t.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for FakeJointDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn echo_loop(
    joints: &[String],
    commands: &Receiver<CommandFrame>,
    states: &Sender<JointStateMsg>,
    is_running: &AtomicBool,
) -> u64 {
    info!("Fake joint driver running for {} joints", joints.len());

    let mut last: Option<(Instant, CommandFrame)> = None;
    let mut published = 0u64;

    while is_running.load(Ordering::Acquire) {
        let frame = match commands.recv_timeout(POLL_INTERVAL) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let now = Instant::now();
        let mut msg = JointStateMsg::default();
        for (slot, (name, &position)) in joints.iter().zip(frame.iter()).enumerate() {
            let velocity = match &last {
                Some((at, prev)) => {
                    let dt = now.duration_since(*at).as_secs_f64();
                    match prev.get(slot) {
                        Some(&p) if dt > 0.0 => (position - p) / dt,
                        _ => 0.0,
                    }
                }
                None => 0.0,
            };
            msg.name.push(name.clone());
            msg.position.push(position);
            msg.velocity.push(velocity);
        }

        match states.try_send(msg) {
            Ok(()) => published += 1,
            Err(TrySendError::Full(_)) => trace!("Joint state feed full, measurement dropped"),
            Err(TrySendError::Disconnected(_)) => break,
        }
        last = Some((now, frame));
    }

    debug!("Fake joint driver stopped after {} measurements", published);
    published
}
