//! Wall-clock alignment
//!
//! Deadlines are always re-derived from the wall clock instead of being
//! accumulated from a fixed period, so timer error never compounds.

pub mod align;

pub use align::{
    floor_to_unit, increment_deadline, next_boundary, to_time_delta, to_timer_duration,
    until_next_boundary, TimeUnit,
};
