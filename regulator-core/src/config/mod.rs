//! Configuration types
//!
//! Board-agnostic configuration structures, deserialized by the daemon from
//! TOML when the `serde` feature is enabled.

pub mod types;

pub use types::*;
