//! Actuation collaborators.
//!
//! `write()` hands the command frame of every tick to an [`Actuator`]. It runs
//! on the control cycle, so implementations must return immediately: any real
//! I/O belongs on a thread the actuator feeds, never inside `submit()`.

use crossbeam_channel::{Sender, TrySendError};
use robot_common::hal::types::CommandFrame;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Receiver of per-tick joint commands.
pub trait Actuator: Send {
    /// Accept the commands of one tick.
    ///
    /// `joints[i]` names the joint commanded by `frame[i]`.
    fn submit(&mut self, joints: &[Arc<str>], frame: &CommandFrame);
}

/// Actuator that only logs the commands it receives.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    frames: u64,
}

impl LoggingActuator {
    /// New logging actuator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames received.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Actuator for LoggingActuator {
    fn submit(&mut self, joints: &[Arc<str>], frame: &CommandFrame) {
        for (slot, (joint, command)) in joints.iter().zip(frame.iter()).enumerate() {
            debug!("Got command {:.5} for joint {} ({})", command, slot, joint);
        }
        self.frames += 1;
    }
}

/// Actuator that forwards frames over a bounded channel without blocking.
///
/// A full or disconnected channel drops the frame; drops are counted and
/// logged at a bounded rate.
#[derive(Debug)]
pub struct ChannelActuator {
    tx: Sender<CommandFrame>,
    dropped: Arc<AtomicU64>,
}

impl ChannelActuator {
    /// Forward frames to `tx`.
    pub fn new(tx: Sender<CommandFrame>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter of dropped frames.
    pub fn dropped_counter(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }

    /// Frames dropped so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Actuator for ChannelActuator {
    fn submit(&mut self, _joints: &[Arc<str>], frame: &CommandFrame) {
        let reason = match self.tx.try_send(frame.clone()) {
            Ok(()) => return,
            Err(TrySendError::Full(_)) => "full",
            Err(TrySendError::Disconnected(_)) => "disconnected",
        };

        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped <= 10 || dropped % 1000 == 0 {
            warn!("Command frame #{} dropped: channel {}", dropped, reason);
        }
    }
}
