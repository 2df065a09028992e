//! # Robot Hardware Binary
//!
//! Loads a hardware description, configures and starts the joint-state
//! component, and drives it from a fixed-rate read/write loop.
//!
//! # Usage
//!
//! ```bash
//! # Relaxation fallback, no measurement source
//! robot_hardware --config config/robot.toml
//!
//! # Fake joint driver echoing commands back as measurements
//! robot_hardware --config config/robot.toml --fake
//!
//! # Initial commands, bounded run, verbose logging
//! robot_hardware -c config/robot.toml --command joint1=0.5 --cycles 500 -v
//! ```

#![deny(warnings)]

use clap::Parser;
use robot_common::config::{ConfigLoader, LogLevel, RobotConfig};
use robot_common::consts::{DEFAULT_CONFIG_PATH, JOINT_STATES_QUEUE_DEPTH, JOINT_STATES_TOPIC};
use robot_hardware::{ChannelActuator, FakeJointDriver, HardwareHost, JointStateSystem};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// Robot Hardware - joint-state component with a fixed-rate host
#[derive(Parser, Debug)]
#[command(name = "robot_hardware")]
#[command(version)]
#[command(about = "Joint-state hardware component with a fixed-rate read/write host")]
#[command(long_about = None)]
struct Args {
    /// Path to the hardware description (robot.toml).
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Echo commands back as measurements through a fake joint driver
    #[arg(long)]
    fake: bool,

    /// Initial position command, `joint=value` (can be specified multiple times)
    #[arg(long = "command", value_parser = parse_command, action = clap::ArgAction::Append)]
    commands: Vec<(String, f64)>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Hardware startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = RobotConfig::load(&args.config)?;
    config.validate()?;

    setup_tracing(&args, config.shared.log_level);

    info!(
        "Robot Hardware v{} starting ({})...",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    let span = info_span!("robot_hardware", hardware = %config.hardware.name);
    let mut builder = JointStateSystem::builder().span(span);

    let mut fake_driver = None;
    if args.fake {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(JOINT_STATES_QUEUE_DEPTH);
        let (state_tx, state_rx) = crossbeam_channel::bounded(JOINT_STATES_QUEUE_DEPTH);
        let joints = config
            .hardware
            .joints
            .iter()
            .map(|j| j.name.clone())
            .collect();

        fake_driver = Some(FakeJointDriver::spawn(joints, cmd_rx, state_tx)?);
        builder = builder
            .feed(state_rx)
            .actuator(Box::new(ChannelActuator::new(cmd_tx)));
        info!("Fake joint driver publishing on {}", JOINT_STATES_TOPIC);
    }

    let mut host = HardwareHost::new(Box::new(builder.build()), config.host.cycle_time());

    // Setup signal handler.
    let running = host.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    host.init(&config.hardware)?;

    for (joint, value) in &args.commands {
        if !host.set_command(joint, *value) {
            warn!("Ignoring command for unknown joint '{}'", joint);
        }
    }

    if let Err(e) = host.run(args.cycles) {
        error!("Control loop error: {}", e);
    }

    host.shutdown()?;

    if let Some(mut driver) = fake_driver {
        let published = driver.stop();
        info!("Fake joint driver published {} measurements", published);
    }

    let stats = host.stats();
    info!(
        "Robot Hardware shutdown complete: {} cycles, avg={}us, max={}us",
        stats.cycle_count,
        stats.avg_cycle_time_us(),
        stats.max_cycle_time_us
    );
    Ok(())
}

/// Parse a `joint=value` command argument.
fn parse_command(arg: &str) -> Result<(String, f64), String> {
    let (joint, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected joint=value, got '{arg}'"))?;
    if joint.is_empty() {
        return Err(format!("missing joint name in '{arg}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid command value '{value}': {e}"))?;
    Ok((joint.trim().to_string(), value))
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
