//! Boundary truncation and deadline math

use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};
use embassy_time::Duration;

/// Unit a hand advances by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    /// Length of one unit
    pub fn delta(self) -> TimeDelta {
        match self {
            TimeUnit::Second => TimeDelta::seconds(1),
            TimeUnit::Minute => TimeDelta::minutes(1),
            TimeUnit::Hour => TimeDelta::hours(1),
        }
    }
}

/// Start of the unit containing `now`, on the local wall clock of its zone
///
/// Works by subtracting the local sub-unit components, so it never has to
/// map a local time back through a DST gap or overlap.
pub fn floor_to_unit<Z: TimeZone>(now: &DateTime<Z>, unit: TimeUnit) -> DateTime<Z> {
    // Leap seconds are reported as nanosecond >= 1e9
    let nanos = TimeDelta::nanoseconds((now.nanosecond() % 1_000_000_000) as i64);
    let seconds = TimeDelta::seconds(now.second() as i64);
    let minutes = TimeDelta::minutes(now.minute() as i64);

    let into_unit = match unit {
        TimeUnit::Second => nanos,
        TimeUnit::Minute => seconds + nanos,
        TimeUnit::Hour => minutes + seconds + nanos,
    };
    now.clone() - into_unit
}

/// First boundary strictly after `now`
pub fn next_boundary<Z: TimeZone>(now: &DateTime<Z>, unit: TimeUnit) -> DateTime<Z> {
    floor_to_unit(now, unit) + unit.delta()
}

/// Time left until the next boundary of `unit` in the zone of `now`
pub fn until_next_boundary<Z: TimeZone>(now: &DateTime<Z>, unit: TimeUnit) -> TimeDelta {
    next_boundary(now, unit).signed_duration_since(now.clone())
}

/// Instant the increment broadcast must go out for the coming minute
///
/// The current minute boundary plus one minute, less the lead the slaves
/// need to act on the increment. May lie in the past when `now` is already
/// inside the lead window.
pub fn increment_deadline(now: &DateTime<Utc>, lead: TimeDelta) -> DateTime<Utc> {
    next_boundary(now, TimeUnit::Minute) - lead
}

/// Convert a wall-clock delta into a timer delay
///
/// Negative deltas clamp to zero. Rounds up to the next microsecond so a
/// timer never wakes before the boundary it was armed for.
pub fn to_timer_duration(delta: TimeDelta) -> Duration {
    if delta <= TimeDelta::zero() {
        return Duration::from_ticks(0);
    }
    let micros = match delta.num_microseconds() {
        Some(us) => {
            let exact = TimeDelta::microseconds(us) == delta;
            if exact {
                us
            } else {
                us + 1
            }
        }
        None => i64::MAX,
    };
    Duration::from_micros(micros as u64)
}

/// Convert a timer duration into a wall-clock delta
pub fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::microseconds(duration.as_micros() as i64)
}
