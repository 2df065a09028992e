//! Relaxation fallback for running without a measurement source.
//!
//! Every read moves each joint's position a fixed fraction of the way toward
//! its command: `position += (command - position) / slowdown`. Velocity is the
//! resulting displacement over the cycle period.

use super::mirror::StateMirror;
use std::time::Duration;

/// First-order relaxation of position toward command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationPolicy {
    slowdown: f64,
}

impl RelaxationPolicy {
    /// Policy with the given damping factor.
    ///
    /// `slowdown` must be finite and > 0; configure checks this before
    /// selecting the policy.
    pub fn new(slowdown: f64) -> Self {
        Self { slowdown }
    }

    /// Damping factor.
    pub fn slowdown(&self) -> f64 {
        self.slowdown
    }

    /// Advance every joint by one cycle of length `period`.
    pub fn step(&self, mirror: &StateMirror, period: Duration) {
        let dt = period.as_secs_f64();

        for slot in 0..mirror.len() {
            let Some(cell) = mirror.cell(slot) else {
                continue;
            };
            let command = cell.command().get();
            if command.is_nan() {
                continue;
            }

            cell.update_sample(|sample| {
                let delta = (command - sample.position) / self.slowdown;
                sample.position += delta;
                sample.velocity = if dt > 0.0 { delta / dt } else { 0.0 };
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_moves_fraction_toward_command() {
        let mirror = StateMirror::new(1);
        mirror.seed_defaults();
        mirror.cell(0).unwrap().command().set(10.0);

        let policy = RelaxationPolicy::new(4.0);
        policy.step(&mirror, Duration::from_millis(10));

        let sample = mirror.sample(0).unwrap();
        assert!((sample.position - 2.5).abs() < 1e-12);
        assert!((sample.velocity - 250.0).abs() < 1e-9);
    }

    #[test]
    fn converges_to_command() {
        let mirror = StateMirror::new(2);
        mirror.seed_defaults();
        mirror.cell(0).unwrap().command().set(1.0);
        mirror.cell(1).unwrap().command().set(-2.0);

        let policy = RelaxationPolicy::new(2.0);
        for _ in 0..100 {
            policy.step(&mirror, Duration::from_millis(10));
        }

        assert!((mirror.sample(0).unwrap().position - 1.0).abs() < 1e-9);
        assert!((mirror.sample(1).unwrap().position + 2.0).abs() < 1e-9);
        assert!(mirror.sample(0).unwrap().velocity.abs() < 1e-6);
    }

    #[test]
    fn zero_period_reports_zero_velocity() {
        let mirror = StateMirror::new(1);
        mirror.seed_defaults();
        mirror.cell(0).unwrap().command().set(1.0);

        RelaxationPolicy::new(1.0).step(&mirror, Duration::ZERO);
        let sample = mirror.sample(0).unwrap();
        assert_eq!(sample.position, 1.0);
        assert_eq!(sample.velocity, 0.0);
    }
}
