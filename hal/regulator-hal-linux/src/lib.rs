//! Linux HAL for the Regulator master clock
//!
//! Implements the `regulator-hal` traits on a Linux host:
//!
//! - GPIO lines through the character device (`/dev/gpiochipN`), with
//!   kernel-side debounce on trigger inputs
//! - Serial ports through `serialport`
//! - Wall clock from the system time
//!
//! Blocking reads (edge events, inbound serial bytes) run on dedicated OS
//! threads so they never stall the async executor.

#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod uart;

pub use clock::SystemClock;
pub use gpio::{GpioError, LineAddress, LinuxOutput, LinuxPins, LinuxTrigger};
pub use uart::{open_serial, SerialError, SerialRx, SerialTx};
