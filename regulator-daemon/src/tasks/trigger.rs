//! Trigger watcher task

use tracing::info;

use regulator_core::hand::TriggerWatcher;
use regulator_hal_linux::LinuxTrigger;

/// Watches the sense input of one hand
#[embassy_executor::task(pool_size = 3)]
pub async fn trigger_task(watcher: TriggerWatcher<'static, LinuxTrigger>) {
    info!(
        "{} trigger task started, cascade of {}",
        watcher.kind(),
        watcher.cascade_len()
    );
    watcher.run().await;
}
