//! Wall-clock scheduler task

use chrono_tz::Tz;
use tracing::info;

use regulator_core::hand::WallClockScheduler;
use regulator_hal_linux::SystemClock;

#[embassy_executor::task(pool_size = 3)]
pub async fn schedule_task(scheduler: WallClockScheduler<'static, SystemClock, Tz>) {
    info!(
        "{} scheduler started, first pulse at {}",
        scheduler.kind(),
        scheduler.next_deadline()
    );
    scheduler.run().await;
}
