//! System wall clock

use chrono::{DateTime, Utc};
use regulator_hal::WallClock;

/// The host's real-time clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
