//! Board-agnostic engine for the Regulator master clock
//!
//! This crate contains all actuation and synchronization logic that does
//! not depend on a specific platform:
//!
//! - Configuration type definitions
//! - Wall-clock alignment math
//! - Zero-capacity actuation request queues
//! - Hand actuator, trigger watcher and wall-clock scheduler
//! - Hand supervisor assembly
//! - Slave clock broadcaster

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod broadcast;
pub mod config;
pub mod hand;
pub mod queue;
pub mod supervisor;
pub mod time;

#[cfg(test)]
mod testing;
