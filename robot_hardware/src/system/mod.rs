//! Joint-state system component.
//!
//! `JointStateSystem` implements [`SystemInterface`]: it validates the joint
//! list, mirrors positions and velocities pushed by a measurement source, and
//! forwards position commands to an [`Actuator`] once per control cycle.
//!
//! # Lifecycle
//!
//! ```text
//! UNCONFIGURED ──configure()──► CONFIGURED ──start()──► STARTED ──stop()──► STOPPED
//!      ▲  │ (error)
//!      └──┘
//! ```
//!
//! Logging goes through the `tracing::Span` supplied at construction, so
//! several components in one process stay distinguishable.

mod index;
mod mirror;
mod relax;
mod subscription;

pub use index::JointIndex;
pub use mirror::{ApplyStats, StateMirror};
pub use relax::RelaxationPolicy;
pub use subscription::{Subscription, SubscriptionStats};

use crate::actuation::{Actuator, LoggingActuator};
use crossbeam_channel::Receiver;
use robot_common::hal::config::{HardwareInfo, HardwareParams, StateSourceKind};
use robot_common::hal::consts::PARAM_STATE_SOURCE;
use robot_common::hal::driver::{HalError, SystemInterface};
use robot_common::hal::interface::{CommandInterface, JointSample, StateInterface};
use robot_common::hal::types::{CommandFrame, JointStateMsg, LifecycleStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Span, debug, error, info, info_span, trace, warn};

/// Default component name until `configure()` supplies one.
const DEFAULT_NAME: &str = "RobotHardware";

/// How measured state is produced once started.
#[derive(Debug, Clone, Copy)]
enum StateSource {
    Subscription,
    Relaxation(RelaxationPolicy),
}

impl StateSource {
    fn kind(&self) -> StateSourceKind {
        match self {
            Self::Subscription => StateSourceKind::Subscription,
            Self::Relaxation(_) => StateSourceKind::Relaxation,
        }
    }
}

/// Everything committed by a successful `configure()`.
struct Configuration {
    params: HardwareParams,
    source: StateSource,
    index: Arc<JointIndex>,
    mirror: Arc<StateMirror>,
}

/// Builder for [`JointStateSystem`].
pub struct JointStateSystemBuilder {
    feed: Option<Receiver<JointStateMsg>>,
    actuator: Option<Box<dyn Actuator>>,
    span: Option<Span>,
}

impl JointStateSystemBuilder {
    /// Live measurement feed; without one the relaxation fallback is used.
    pub fn feed(mut self, feed: Receiver<JointStateMsg>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Collaborator receiving the commands of each tick.
    pub fn actuator(mut self, actuator: Box<dyn Actuator>) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Span all of the component's logging is recorded in.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Build an unconfigured component.
    pub fn build(self) -> JointStateSystem {
        JointStateSystem {
            name: DEFAULT_NAME.to_string(),
            span: self
                .span
                .unwrap_or_else(|| info_span!("robot_hardware", hardware = DEFAULT_NAME)),
            status: LifecycleStatus::Unconfigured,
            feed: self.feed,
            actuator: self
                .actuator
                .unwrap_or_else(|| Box::new(LoggingActuator::new())),
            config: None,
            subscription: None,
            frame: CommandFrame::new(),
            cycles: 0,
        }
    }
}

/// Hardware component mirroring joint state and forwarding position commands.
pub struct JointStateSystem {
    name: String,
    span: Span,
    status: LifecycleStatus,
    feed: Option<Receiver<JointStateMsg>>,
    actuator: Box<dyn Actuator>,
    config: Option<Configuration>,
    subscription: Option<Subscription>,
    frame: CommandFrame,
    cycles: u64,
}

impl JointStateSystem {
    /// Start building a component.
    pub fn builder() -> JointStateSystemBuilder {
        JointStateSystemBuilder {
            feed: None,
            actuator: None,
            span: None,
        }
    }

    /// Apply one measurement message to the mirror.
    ///
    /// This is the subscription callback; hosts with their own transport may
    /// call it directly. Only a configured or started component accepts
    /// measurements; before `configure()` and after `stop()` it does nothing.
    pub fn on_joint_states(&self, msg: &JointStateMsg) -> ApplyStats {
        if !matches!(
            self.status,
            LifecycleStatus::Configured | LifecycleStatus::Started
        ) {
            trace!(parent: &self.span, "joint states ignored while {}", self.status);
            return ApplyStats::default();
        }
        match &self.config {
            Some(config) => config.mirror.apply(&config.index, msg),
            None => ApplyStats::default(),
        }
    }

    /// Typed hardware parameters, once configured.
    pub fn params(&self) -> Option<&HardwareParams> {
        self.config.as_ref().map(|c| &c.params)
    }

    /// Selected state source, once configured.
    pub fn state_source(&self) -> Option<StateSourceKind> {
        self.config.as_ref().map(|c| c.source.kind())
    }

    /// Joint names in slot order.
    pub fn joint_names(&self) -> &[Arc<str>] {
        match &self.config {
            Some(config) => config.index.names(),
            None => &[],
        }
    }

    /// Latest measured state of `joint`.
    pub fn sample(&self, joint: &str) -> Option<JointSample> {
        let config = self.config.as_ref()?;
        config.mirror.sample(config.index.slot(joint)?)
    }

    /// State of `joint` as exported through the state handles.
    pub fn published(&self, joint: &str) -> Option<JointSample> {
        let config = self.config.as_ref()?;
        config.mirror.published(config.index.slot(joint)?)
    }

    /// Current command of `joint`.
    pub fn command(&self, joint: &str) -> Option<f64> {
        let config = self.config.as_ref()?;
        config.mirror.command(config.index.slot(joint)?)
    }

    /// Counters of the open subscription.
    pub fn subscription_stats(&self) -> Option<&SubscriptionStats> {
        self.subscription.as_ref().map(|s| s.stats())
    }

    /// Read/write cycles executed while started.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn require(&self, expected: LifecycleStatus, operation: &'static str) -> Result<(), HalError> {
        if self.status != expected {
            let err = HalError::InvalidTransition {
                operation,
                status: self.status,
            };
            warn!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    fn select_source(&self, params: &HardwareParams) -> Result<StateSource, HalError> {
        let has_feed = self.feed.is_some();
        let kind = match params.state_source {
            Some(StateSourceKind::Subscription) if !has_feed => {
                return Err(HalError::Parameter {
                    key: PARAM_STATE_SOURCE.to_string(),
                    reason: "subscription requested but no measurement feed is connected"
                        .to_string(),
                });
            }
            Some(kind) => kind,
            None if has_feed => StateSourceKind::Subscription,
            None => StateSourceKind::Relaxation,
        };

        match kind {
            StateSourceKind::Subscription => Ok(StateSource::Subscription),
            StateSourceKind::Relaxation => {
                params.validate_slowdown()?;
                Ok(StateSource::Relaxation(RelaxationPolicy::new(params.slowdown)))
            }
        }
    }

    fn build_configuration(&self, info: &HardwareInfo) -> Result<Configuration, HalError> {
        let params = HardwareParams::from_info(info)?;
        info.validate_joints()?;

        for joint in &info.joints {
            for iface in joint.unsupported_state_interfaces() {
                warn!(
                    "Joint '{}' declares state interface '{}', which is not exported",
                    joint.name, iface.name
                );
            }
        }

        let source = self.select_source(&params)?;
        let index = Arc::new(JointIndex::build(&info.joints));
        let mirror = Arc::new(StateMirror::new(index.len()));

        Ok(Configuration {
            params,
            source,
            index,
            mirror,
        })
    }
}

impl SystemInterface for JointStateSystem {
    fn configure(&mut self, info: &HardwareInfo) -> Result<(), HalError> {
        let _entered = self.span.clone().entered();
        self.require(LifecycleStatus::Unconfigured, "configure")?;

        let config = self.build_configuration(info).inspect_err(|e| {
            error!("Configuration of '{}' failed: {}", info.name, e);
        })?;

        info!(
            "Configured '{}': {} joints, source={:?}, start={:?}, stop={:?}, slowdown={}",
            info.name,
            config.index.len(),
            config.source.kind(),
            config.params.start_duration,
            config.params.stop_duration,
            config.params.slowdown
        );

        if !info.name.is_empty() {
            self.name = info.name.clone();
        }
        self.config = Some(config);
        self.status = LifecycleStatus::Configured;
        Ok(())
    }

    fn export_state_interfaces(&self) -> Vec<StateInterface> {
        match &self.config {
            Some(config) => config.mirror.state_interfaces(&config.index),
            None => Vec::new(),
        }
    }

    fn export_command_interfaces(&self) -> Vec<CommandInterface> {
        match &self.config {
            Some(config) => config.mirror.command_interfaces(&config.index),
            None => Vec::new(),
        }
    }

    fn start(&mut self) -> Result<(), HalError> {
        let _entered = self.span.clone().entered();
        self.require(LifecycleStatus::Configured, "start")?;
        let Some(config) = self.config.as_ref() else {
            return Err(HalError::InvalidTransition {
                operation: "start",
                status: self.status,
            });
        };

        info!("Starting ...please wait...");

        if let StateSource::Subscription = config.source {
            let Some(feed) = self.feed.clone() else {
                return Err(HalError::Subscription(
                    "measurement feed is not connected".to_string(),
                ));
            };
            let subscription = Subscription::open(
                feed,
                config.index.clone(),
                config.mirror.clone(),
                self.span.clone(),
            )?;
            self.subscription = Some(subscription);
        }

        let seeded = config.mirror.seed_defaults();
        config.mirror.publish();
        debug!("Defaulted {} undefined joint positions to 0", seeded);

        self.status = LifecycleStatus::Started;
        info!("System successfully started!");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        let _entered = self.span.clone().entered();
        self.require(LifecycleStatus::Started, "stop")?;

        info!("Stopping ...please wait...");
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }

        self.status = LifecycleStatus::Stopped;
        info!("System successfully stopped after {} cycles!", self.cycles);
        Ok(())
    }

    fn read(&mut self, period: Duration) -> Result<(), HalError> {
        if self.status != LifecycleStatus::Started {
            trace!(parent: &self.span, "read ignored while {}", self.status);
            return Ok(());
        }
        let Some(config) = self.config.as_ref() else {
            return Ok(());
        };

        if let StateSource::Relaxation(policy) = config.source {
            policy.step(&config.mirror, period);
        }
        // State handles see this snapshot until the next read.
        config.mirror.publish();
        self.cycles += 1;
        Ok(())
    }

    fn write(&mut self) -> Result<(), HalError> {
        if self.status != LifecycleStatus::Started {
            trace!(parent: &self.span, "write ignored while {}", self.status);
            return Ok(());
        }
        let Some(config) = self.config.as_ref() else {
            return Ok(());
        };

        config.mirror.fill_frame(&mut self.frame);
        let _entered = self.span.enter();
        self.actuator.submit(config.index.names(), &self.frame);
        Ok(())
    }

    fn status(&self) -> LifecycleStatus {
        self.status
    }

    fn name(&self) -> &str {
        &self.name
    }
}
