//! Hand actuator task

use tracing::info;

use regulator_core::hand::HandActuator;
use regulator_core::queue::QueueReceiver;
use regulator_hal_linux::LinuxOutput;

/// Drives one hand, one full pulse per taken request
#[embassy_executor::task(pool_size = 3)]
pub async fn actuator_task(actuator: HandActuator<LinuxOutput>, requests: QueueReceiver<'static>) {
    info!("{} actuator task started", actuator.kind());
    actuator.run(requests).await;
}
