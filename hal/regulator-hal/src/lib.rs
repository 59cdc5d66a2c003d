//! Regulator Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits consumed by the
//! pulse-actuation engine. Platform crates implement them so the same
//! engine can drive real GPIO lines and serial ports, or test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (regulator-daemon)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  regulator-core (engine, generic)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  regulator-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ regulator-hal-  │
//!            │     linux       │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::TriggerInput`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`clock::WallClock`] - Civil time source

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::WallClock;
pub use gpio::{Level, OutputPin, TriggerInput};
pub use uart::{UartConfig, UartRx, UartTx};
