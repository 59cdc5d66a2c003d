//! Regulator - Master Clock Daemon
//!
//! Drives the seconds, minutes and hours hands of a master clock from GPIO
//! lines and keeps up to eight slave clock faces in step over a shared
//! serial line.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use embassy_executor::Spawner;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use regulator_core::broadcast::{BroadcastTiming, Broadcaster};
use regulator_hal_linux::{open_serial, SerialRx, SerialTx, SystemClock};

use crate::cli::Cli;
use crate::config::{load_config, log_config_summary, resolve_slots, DaemonConfig};

mod channels;
mod cli;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match configure(&cli) {
        Ok(config) => config,
        Err(e) => fatal(e),
    };

    // Hands first; they never hold up the broadcaster
    tasks::start_hands(&spawner, &config.pulser);

    let (tx, rx) = match open_link(&config) {
        Ok(link) => link,
        Err(e) => fatal(e),
    };
    if let Err(e) = tasks::spawn_serial_listener(rx) {
        fatal(anyhow::Error::new(e).context("cannot start serial listener"));
    }

    let slots = match resolve_slots(&config.broadcast) {
        Ok(slots) => slots,
        Err(e) => fatal(e.into()),
    };
    let broadcaster = Broadcaster::new(
        tx,
        SystemClock,
        slots,
        BroadcastTiming::from(&config.broadcast),
    );
    info!("Broadcasting to {} slots", broadcaster.slots().len());

    // The broadcaster is the main loop
    broadcaster.run().await;
}

/// Load the configuration file and apply command-line overrides
fn configure(cli: &Cli) -> Result<DaemonConfig> {
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config).context("applying command-line options")?;
    log_config_summary(&config);
    Ok(config)
}

fn open_link(config: &DaemonConfig) -> Result<(SerialTx, SerialRx)> {
    let device = &config.serial.device;
    info!("Opening serial: {}", device);
    open_serial(device, &config.serial.uart()).with_context(|| format!("opening {}", device))
}

fn fatal(e: anyhow::Error) -> ! {
    error!("{:#}", e);
    process::exit(1);
}
