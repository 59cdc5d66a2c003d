//! Civil time source
//!
//! The engine aligns pulses to wall-clock boundaries, so it needs the
//! current UTC instant rather than a monotonic tick count.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock instant
pub trait WallClock {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

impl<C: WallClock + ?Sized> WallClock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
