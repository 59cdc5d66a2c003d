//! Serial line abstractions
//!
//! The slave clocks listen on a plain 8N1 line without flow control, so
//! the only setting a platform needs is the line speed.

/// Serial transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error: core::fmt::Debug;

    /// Write `data` and wait until it has left the transmitter
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Serial receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error: core::fmt::Debug;

    /// Read data from the line
    ///
    /// Blocks until at least one byte is available, the platform read
    /// timeout elapses (returns `Ok(0)`), or an error occurs.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Line settings: 8 data bits, no parity, 1 stop bit, no flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self { baudrate: 19200 }
    }
}
