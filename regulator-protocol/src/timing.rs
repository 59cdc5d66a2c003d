//! Wire timing constants
//!
//! The slave clocks were built around a pulse-coded symbol scheme. Nothing
//! in the ASCII protocol is encoded with it any more, but the time it takes
//! a slave to act on an increment is still budgeted in those symbols, and
//! that budget is how far ahead of the minute the increment must be sent.

use core::time::Duration;

/// Serial line speed expected by the slaves
pub const BAUD_RATE: u32 = 19200;

/// Quiet time after every message before the next may be sent
pub const MESSAGE_SPACING: Duration = Duration::from_millis(100);

/// Duration of one base symbol unit
pub const BASE_SYMBOL: Duration = Duration::from_millis(2);

/// Zero symbol length in base units
pub const ZERO_SYMBOLS: u32 = 2 + 2;

/// One symbol length in base units
pub const ONE_SYMBOLS: u32 = 5 + 2;

/// Default lead time for the increment broadcast
///
/// One zero symbol followed by three one symbols (50 ms).
pub const fn increment_lead() -> Duration {
    let units = ZERO_SYMBOLS + 3 * ONE_SYMBOLS;
    Duration::from_millis(BASE_SYMBOL.as_millis() as u64 * units as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_lead() {
        assert_eq!(increment_lead(), Duration::from_millis(50));
    }

    #[test]
    fn test_lead_shorter_than_spacing() {
        // The increment must be fully on the wire before the set round starts
        assert!(increment_lead() < MESSAGE_SPACING);
    }
}
