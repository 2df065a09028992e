//! Hardware host and fixed-rate control loop.
//!
//! `HardwareHost` is the minimal owner of a [`SystemInterface`]: it configures
//! and starts the component, keeps the exported handles, and calls
//! `read()` then `write()` once per cycle until asked to stop.

use robot_common::hal::config::HardwareInfo;
use robot_common::hal::driver::{HalError, SystemInterface};
use robot_common::hal::interface::{CommandInterface, StateInterface};
use robot_common::hal::types::{InterfaceKind, LifecycleStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timing statistics for control loop monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Number of cycles that exceeded the cycle time
    pub timing_violations: u64,
    /// Maximum observed cycle time
    pub max_cycle_time_us: u64,
    /// Sum of cycle times for average calculation
    pub total_cycle_time_us: u64,
}

impl TimingStats {
    /// Average cycle time in microseconds.
    pub fn avg_cycle_time_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.total_cycle_time_us / self.cycle_count
        }
    }

    fn record(&mut self, cycle_time_us: u64, target_us: u64) -> bool {
        self.cycle_count += 1;
        self.total_cycle_time_us += cycle_time_us;
        self.max_cycle_time_us = self.max_cycle_time_us.max(cycle_time_us);
        let violated = cycle_time_us > target_us;
        if violated {
            self.timing_violations += 1;
        }
        violated
    }
}

/// Drives one hardware component through its lifecycle.
pub struct HardwareHost {
    /// Component under control
    system: Box<dyn SystemInterface>,
    /// Running flag for loop control
    running: Arc<AtomicBool>,
    /// Target cycle time
    cycle_time: Duration,
    /// Timing statistics
    stats: TimingStats,
    /// Handles collected after configure
    state_interfaces: Vec<StateInterface>,
    command_interfaces: Vec<CommandInterface>,
}

impl HardwareHost {
    /// Host for `system` running at `cycle_time`.
    pub fn new(system: Box<dyn SystemInterface>, cycle_time: Duration) -> Self {
        Self {
            system,
            running: Arc::new(AtomicBool::new(false)),
            cycle_time,
            stats: TimingStats::default(),
            state_interfaces: Vec::new(),
            command_interfaces: Vec::new(),
        }
    }

    /// Configure and start the component, collecting its handles.
    ///
    /// # Errors
    /// Propagates the component's configure/start error; the component is
    /// left in whatever state it reached.
    pub fn init(&mut self, info: &HardwareInfo) -> Result<(), HalError> {
        info!("Initializing host for '{}'...", info.name);

        self.system.configure(info)?;
        self.state_interfaces = self.system.export_state_interfaces();
        self.command_interfaces = self.system.export_command_interfaces();
        info!(
            "Exported {} state and {} command interfaces",
            self.state_interfaces.len(),
            self.command_interfaces.len()
        );

        self.system.start()?;
        info!("Host initialized, component {}", self.system.status());
        Ok(())
    }

    /// Exported state handles.
    pub fn state_interfaces(&self) -> &[StateInterface] {
        &self.state_interfaces
    }

    /// Exported command handles.
    pub fn command_interfaces(&self) -> &[CommandInterface] {
        &self.command_interfaces
    }

    /// Value of the `kind` state interface of `joint`.
    pub fn state_value(&self, joint: &str, kind: InterfaceKind) -> Option<f64> {
        self.state_interfaces
            .iter()
            .find(|s| s.prefix_name() == joint && s.kind() == kind)
            .map(StateInterface::value)
    }

    /// Set the position command of `joint`. Returns false for unknown joints.
    pub fn set_command(&self, joint: &str, value: f64) -> bool {
        match self
            .command_interfaces
            .iter()
            .find(|c| c.prefix_name() == joint)
        {
            Some(command) => {
                command.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Execute a single read/write cycle.
    pub fn cycle(&mut self, period: Duration) -> Result<(), HalError> {
        self.system.read(period)?;
        self.system.write()
    }

    /// Run the control loop.
    ///
    /// Blocks until the running flag is cleared or `max_cycles` cycles have
    /// run.
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<(), HalError> {
        if self.system.status() != LifecycleStatus::Started {
            return Err(HalError::InvalidTransition {
                operation: "run",
                status: self.system.status(),
            });
        }

        info!(
            "Starting control loop (cycle_time={}us)...",
            self.cycle_time.as_micros()
        );
        if detect_rt_mode() {
            info!("Running in real-time mode");
        } else {
            info!("Running in standard (non-RT) mode");
        }
        self.running.store(true, Ordering::SeqCst);

        let target_us = self.cycle_time.as_micros() as u64;
        let mut last_cycle = Instant::now();
        let mut executed = 0u64;

        while self.running.load(Ordering::SeqCst) {
            if max_cycles.is_some_and(|max| executed >= max) {
                break;
            }

            let cycle_start = Instant::now();
            let period = cycle_start.duration_since(last_cycle);
            last_cycle = cycle_start;

            self.cycle(period)?;
            executed += 1;

            let cycle_time_us = cycle_start.elapsed().as_micros() as u64;
            if self.stats.record(cycle_time_us, target_us)
                && (self.stats.timing_violations <= 10
                    || self.stats.timing_violations % 1000 == 0)
            {
                warn!(
                    "Timing violation #{}: cycle took {}us (target {}us)",
                    self.stats.timing_violations, cycle_time_us, target_us
                );
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Control loop: {} cycles, avg={}us, max={}us, violations={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle_time_us(),
                    self.stats.max_cycle_time_us,
                    self.stats.timing_violations
                );
            }

            let elapsed = cycle_start.elapsed();
            if elapsed < self.cycle_time {
                std::thread::sleep(self.cycle_time - elapsed);
            }
        }

        info!(
            "Control loop stopped after {} cycles (violations: {})",
            self.stats.cycle_count, self.stats.timing_violations
        );
        Ok(())
    }

    /// Stop the loop and the component.
    pub fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        if self.system.status() == LifecycleStatus::Started {
            self.system.stop()?;
        }
        Ok(())
    }

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Timing statistics.
    pub fn stats(&self) -> TimingStats {
        self.stats
    }

    /// Lifecycle status of the component.
    pub fn status(&self) -> LifecycleStatus {
        self.system.status()
    }
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: sched_getscheduler(0) only queries the calling thread.
        let policy = unsafe { sched_getscheduler(0) };
        policy == SCHED_FIFO || policy == SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
