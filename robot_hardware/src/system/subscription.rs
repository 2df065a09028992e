//! Joint-state subscription.
//!
//! A receiver thread drains the injected measurement feed and applies every
//! message to the state mirror. The thread polls its feed with a short
//! timeout so `close()` can stop it promptly; once `close()` returns the
//! mirror is no longer touched by this path.

use super::index::JointIndex;
use super::mirror::StateMirror;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use robot_common::hal::driver::HalError;
use robot_common::hal::types::JointStateMsg;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{Span, debug, trace, warn};

/// Poll interval of the receiver thread.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Counters shared with the receiver thread.
#[derive(Debug, Default)]
pub struct SubscriptionStats {
    /// Messages received
    pub messages: AtomicU64,
    /// Entries naming unknown joints
    pub unknown_entries: AtomicU64,
    /// Entries without a position
    pub incomplete_entries: AtomicU64,
}

/// An open subscription; dropped or closed to release the feed.
pub struct Subscription {
    is_running: Arc<AtomicBool>,
    stats: Arc<SubscriptionStats>,
    thread: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn the receiver thread.
    ///
    /// # Errors
    /// `HalError::Subscription` if the thread cannot be spawned.
    pub fn open(
        feed: Receiver<JointStateMsg>,
        index: Arc<JointIndex>,
        mirror: Arc<StateMirror>,
        span: Span,
    ) -> Result<Self, HalError> {
        let is_running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(SubscriptionStats::default());

        let thread = {
            let is_running = is_running.clone();
            let stats = stats.clone();
            thread::Builder::new()
                .name("joint_states_rx".to_string())
                .spawn(move || {
                    let _entered = span.enter();
                    rx_loop(&feed, &index, &mirror, &is_running, &stats);
                })
                .map_err(|e| HalError::Subscription(e.to_string()))?
        };

        Ok(Self {
            is_running,
            stats,
            thread: Some(thread),
        })
    }

    /// Counters of the receiver thread.
    pub fn stats(&self) -> &SubscriptionStats {
        &self.stats
    }

    /// True while the receiver thread is alive.
    pub fn is_open(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the receiver thread and wait for it.
    pub fn close(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Joint state receiver thread panicked");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

fn rx_loop(
    feed: &Receiver<JointStateMsg>,
    index: &JointIndex,
    mirror: &StateMirror,
    is_running: &AtomicBool,
    stats: &SubscriptionStats,
) {
    debug!("Joint state receiver started");

    // Acquire: seeing false means close() has been requested.
    while is_running.load(Ordering::Acquire) {
        let msg = match feed.recv_timeout(POLL_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Joint state feed disconnected");
                break;
            }
        };

        trace!("Got {} joint states", msg.len());
        let applied = mirror.apply(index, &msg);
        // Release: a reader seeing the new count also sees the applied state.
        stats.messages.fetch_add(1, Ordering::Release);
        stats
            .unknown_entries
            .fetch_add(applied.unknown as u64, Ordering::Relaxed);
        stats
            .incomplete_entries
            .fetch_add(applied.incomplete as u64, Ordering::Relaxed);
    }

    debug!(
        "Joint state receiver stopped after {} messages",
        stats.messages.load(Ordering::Relaxed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_common::hal::config::JointDescriptor;
    use std::time::Instant;

    fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn messages_reach_mirror_until_closed() {
        let index = Arc::new(JointIndex::build(&[JointDescriptor::position_joint("j1")]));
        let mirror = Arc::new(StateMirror::new(1));
        let (tx, rx) = crossbeam_channel::bounded(10);

        let mut sub = Subscription::open(rx, index, mirror.clone(), Span::none()).unwrap();
        assert!(sub.is_open());

        tx.send(JointStateMsg::from_triples([("j1", 1.0, 0.1), ("x", 0.0, 0.0)]))
            .unwrap();
        assert!(wait_until(|| mirror.sample(0).unwrap().position == 1.0));
        assert!(wait_until(
            || sub.stats().unknown_entries.load(Ordering::Relaxed) == 1
        ));

        sub.close();
        assert!(!sub.is_open());

        // Nothing is applied once closed.
        let _ = tx.send(JointStateMsg::from_triples([("j1", 5.0, 0.5)]));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(mirror.sample(0).unwrap().position, 1.0);
    }

    #[test]
    fn disconnected_feed_ends_thread() {
        let index = Arc::new(JointIndex::build(&[]));
        let mirror = Arc::new(StateMirror::new(0));
        let (tx, rx) = crossbeam_channel::bounded::<JointStateMsg>(1);

        let sub = Subscription::open(rx, index, mirror, Span::none()).unwrap();
        drop(tx);
        assert!(wait_until(|| !sub.is_open()));
    }
}
