//! Striker onboard runtime.
//!
//! Wires the fixed module set together: one broker, one preallocated thread
//! pool, every module dispatched once and running forever. Modules find each
//! other only through broker topics, so the spawn order below is cosmetic.

mod cmd_server;
mod conn_server;
mod firmware;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use striker_common::config::BotConfig;
use striker_common::topics;
use striker_control::{ControlSubsystem, ModuleEnv, MotionEstimator, MotionModule, spawn_module};
use striker_pubsub::{Broker, Publisher, ThreadPool};

#[derive(Debug, Parser)]
#[command(
    name = "striker_bot",
    about = "Onboard control runtime for the striker soccer robot"
)]
struct Args {
    /// TOML configuration file; compile-time defaults when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulator run: zero the noisy derived feedback velocities so the
    /// velocity controllers pass setpoints through.
    #[arg(long = "virtual")]
    virtual_feedback: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    if args.virtual_feedback {
        config.control.simulator_feedback = true;
    }

    let filter = match config.log_level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(
        simulator_feedback = config.control.simulator_feedback,
        ctrl_frequency = config.control.ctrl_frequency,
        "striker runtime starting"
    );

    let config = Arc::new(config);
    let broker = Broker::new();
    let pool = ThreadPool::new(config.runtime.thread_pool_size)?;
    let env = ModuleEnv::new(Arc::clone(&broker), Arc::clone(&config), &pool);

    // The tuning slot exists from the start; its registered default is the
    // loaded gain table, so the cascade runs on it until a retune arrives.
    let _gains_pub = Publisher::latest(
        &broker,
        topics::PID_CHANNEL,
        topics::PID_CONSTANTS,
        config.gains,
    )?;

    spawn_module(firmware::VirtualFirmwareClient::default(), &pool, env.clone());
    spawn_module(MotionEstimator::default(), &pool, env.clone());
    spawn_module(MotionModule::default(), &pool, env.clone());
    spawn_module(ControlSubsystem::default(), &pool, env.clone());
    spawn_module(cmd_server::CmdServer::default(), &pool, env.clone());
    spawn_module(conn_server::ConnServer::default(), &pool, env);

    info!("all modules dispatched");
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
