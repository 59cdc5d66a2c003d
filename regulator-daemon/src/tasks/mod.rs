//! Embassy async tasks
//!
//! Each hand runs three tasks (actuator, trigger watcher, scheduler) that
//! meet at the hand's request queue. The blocking serial listener gets an
//! OS thread.

pub mod actuator;
pub mod schedule;
pub mod serial_rx;
pub mod trigger;

use embassy_executor::Spawner;
use tracing::{error, info};

use regulator_core::config::PulserConfig;
use regulator_core::supervisor::HandSupervisor;
use regulator_hal_linux::{LinuxOutput, LinuxPins, LinuxTrigger, SystemClock};

use crate::channels::QUEUES;
use crate::config::resolve_zone;

pub use actuator::actuator_task;
pub use schedule::schedule_task;
pub use serial_rx::spawn_serial_listener;
pub use trigger::trigger_task;

/// Assemble the hands and spawn their tasks
///
/// Any failure here disables the affected hands only; the broadcaster
/// keeps running regardless.
pub fn start_hands(spawner: &Spawner, config: &PulserConfig) {
    if !config.enabled {
        info!("Pulser disabled");
        return;
    }

    let Some(zone) = resolve_zone(&config.timezone) else {
        error!(
            "GPIO Pulser: Error loading time location: unknown timezone {:?}",
            config.timezone.as_str()
        );
        return;
    };

    let mut pins = LinuxPins::default();
    let Some(supervisor) =
        HandSupervisor::<LinuxOutput, LinuxTrigger, _>::assemble(config, zone, &mut pins)
    else {
        return;
    };

    for unit in supervisor.into_units(SystemClock, &QUEUES) {
        let kind = unit.kind;
        if let Err(e) = spawner.spawn(actuator_task(unit.actuator, unit.requests)) {
            error!("Cannot spawn {} actuator: {:?}", kind, e);
        }
        if let Err(e) = spawner.spawn(trigger_task(unit.watcher)) {
            error!("Cannot spawn {} trigger watcher: {:?}", kind, e);
        }
        if let Err(e) = spawner.spawn(schedule_task(unit.scheduler)) {
            error!("Cannot spawn {} scheduler: {:?}", kind, e);
        }
        info!("{} hand running", kind);
    }
}
