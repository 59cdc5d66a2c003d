//! Slave Clock Serial Protocol
//!
//! This crate defines the ASCII protocol the master clock uses to drive a
//! bank of slave clock faces over a shared serial line. The protocol has no
//! framing byte and no checksum: message boundaries are defined purely by
//! the sender's pacing (a fixed spacing after every message).
//!
//! # Messages
//!
//! ```text
//! Increment:  'S' 'E'
//! Set:        'S' <slot> <min ones> <min tens> <hour ones> <hour tens>
//! ```
//!
//! Slaves never acknowledge. Anything they send back is only logged.

#![no_std]
#![deny(unsafe_code)]

pub mod messages;
pub mod timing;

pub use messages::{DecodeError, EncodeError, SlaveMessage, WallTime, MAX_MESSAGE_LEN, MAX_SLOTS};
pub use timing::{increment_lead, BAUD_RATE, MESSAGE_SPACING};
