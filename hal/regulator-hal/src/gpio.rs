//! GPIO pin abstractions
//!
//! Provides traits for digital output lines and debounced trigger inputs
//! that can be implemented by platform-specific HALs.

use core::fmt::Debug;

/// Logic level of a GPIO line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// The opposite level
    pub fn inverse(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Digital output pin
///
/// Implementations handle the actual line request for the platform.
/// Each output is owned by exactly one writer.
pub trait OutputPin {
    /// Error type for line writes
    type Error: Debug;

    /// Drive the line to a specific level
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error>;
}

/// Debounced sense input with rising-edge detection
///
/// The edge source is expected to be filtered already (kernel debounce or
/// equivalent); callers add their own settle interval before sampling.
#[allow(async_fn_in_trait)]
pub trait TriggerInput {
    /// Error type for edge waits and samples
    type Error: Debug;

    /// Wait for the next rising edge
    ///
    /// Never times out. An error means the edge read glitched.
    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error>;

    /// Sample the current level of the input
    fn level(&mut self) -> Result<Level, Self::Error>;
}
