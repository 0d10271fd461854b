//! mowerlink-sim: drives a [`PollingCoordinator`] against a simulated mower.
//!
//! ```text
//!  ┌──────────────────────── LocalExecutor ────────────────────────┐
//!  │                                                               │
//!  │  coordinator.run()            scripted operator               │
//!  │  (poll every N s)             start → pause → start → dock    │
//!  │        │                              │                       │
//!  │        └──────── link lock ───────────┘                       │
//!  │                     │                                         │
//!  │              SimulatedMower ──▶ LogEventSink                  │
//!  └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `mowerlink-sim [config.json]`.  Without a config file the
//! simulator polls a fake mower every two seconds.  Set `RUST_LOG=debug`
//! to see every driver read.

use anyhow::{Context, Result};
use embassy_time::Timer;
use log::{info, warn};

use mowerlink::PollingCoordinator;
use mowerlink::adapters::log_sink::LogEventSink;
use mowerlink::adapters::sim::{SimulatedMower, resolve_sim};
use mowerlink::app::commands::MowerCommand;
use mowerlink::config::MowerConfig;
use mowerlink::view::EntityKind;

const SIM_ADDRESS: &str = "SIM:00:00:00:00:01";
const SIM_MODEL: &str = "305";
const SIM_POLL_SECS: u32 = 2;

fn load_config() -> Result<MowerConfig> {
    let Some(path) = std::env::args().nth(1) else {
        let mut config = MowerConfig::new(SIM_ADDRESS, SIM_MODEL);
        config.poll_interval_secs = SIM_POLL_SECS;
        config.io_timeout_ms = 1_000;
        return Ok(config);
    };

    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    MowerConfig::from_json(&json).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("mowerlink-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let poll_secs = u64::from(config.poll_interval_secs);

    let coordinator = PollingCoordinator::new(
        config,
        SimulatedMower::new().with_dropouts(7),
        resolve_sim,
    )
    .context("invalid mower config")?;

    let identity = coordinator.identity();
    info!("Entities:");
    for kind in [
        EntityKind::LawnMower,
        EntityKind::BatteryLevel,
        EntityKind::NextStartTime,
    ] {
        info!("  {:?}: {}", kind, identity.unique_id(kind));
    }

    coordinator.subscribe(LogEventSink::new(identity.address.clone()));

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor.spawn(coordinator.run()).detach();

    let script = async {
        let step = poll_secs * 1_000 * 3;
        for command in [
            MowerCommand::Start,
            MowerCommand::Pause,
            MowerCommand::Start,
            MowerCommand::Dock,
        ] {
            Timer::after_millis(step).await;
            match coordinator.execute(command).await {
                Ok(snap) => info!("{} -> {}", command, snap.normalized()),
                Err(e) => warn!("{} failed: {}", command, e),
            }
            info!("View: {:?}", coordinator.view());
        }
        Timer::after_millis(step).await;
        coordinator.shutdown().await;
    };

    futures_lite::future::block_on(executor.run(script));
    info!("Simulation finished");
    Ok(())
}
