//! Indicator hand actuation
//!
//! Each physical hand (seconds, minutes, hours) is a bistable mechanism
//! advanced by a pulse whose polarity alternates between steps. A hand is
//! driven by three cooperating loops:
//!
//! - [`HandActuator`]: the single consumer of the hand's request queue,
//!   turning each request into one pulse
//! - [`TriggerWatcher`]: converts sensed rising edges into requests
//! - [`WallClockScheduler`]: converts wall-clock boundaries into requests
//!
//! For the shared queue type, see the [`crate::queue`] module.

pub mod actuator;
pub mod schedule;
pub mod trigger;

pub use actuator::HandActuator;
pub use schedule::WallClockScheduler;
pub use trigger::{Cascade, TriggerWatcher, HOUR_CASCADE_LEN};

use core::fmt;

use embassy_time::Duration;
use regulator_hal::Level;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::TimeUnit;

/// Which hand a channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandKind {
    Seconds,
    Minutes,
    Hours,
}

impl HandKind {
    /// Every hand, in startup order
    pub const ALL: [HandKind; 3] = [HandKind::Seconds, HandKind::Minutes, HandKind::Hours];

    /// Wall-clock unit one pulse advances this hand by
    pub fn unit(self) -> TimeUnit {
        match self {
            HandKind::Seconds => TimeUnit::Second,
            HandKind::Minutes => TimeUnit::Minute,
            HandKind::Hours => TimeUnit::Hour,
        }
    }

    /// Lower-case name used in log lines
    pub fn name(self) -> &'static str {
        match self {
            HandKind::Seconds => "seconds",
            HandKind::Minutes => "minutes",
            HandKind::Hours => "hours",
        }
    }
}

impl fmt::Display for HandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output polarity of the pulse line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Pulse asserted low, released high
    #[default]
    Normal,
    /// Pulse asserted high, released low
    Inverted,
}

impl Polarity {
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            Polarity::Inverted
        } else {
            Polarity::Normal
        }
    }

    /// Level that energizes the mechanism
    pub fn asserted(self) -> Level {
        match self {
            Polarity::Normal => Level::Low,
            Polarity::Inverted => Level::High,
        }
    }

    /// Resting level between pulses
    pub fn released(self) -> Level {
        self.asserted().inverse()
    }
}

/// Alternation state of a hand's direction line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Level the direction line is driven to in this state
    pub fn level(self) -> Level {
        match self {
            Direction::Forward => Level::Low,
            Direction::Reverse => Level::High,
        }
    }
}

/// Pulse waveform: assert, hold, release, hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseShape {
    /// Hold time of each half cycle
    pub hold: Duration,
    pub polarity: Polarity,
}

impl PulseShape {
    /// Wall time one actuation occupies
    pub fn period(&self) -> Duration {
        self.hold + self.hold
    }
}
