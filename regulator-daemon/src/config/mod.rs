//! Configuration loading and parsing
//!
//! Loads the daemon configuration from a TOML file or the embedded default,
//! then validates it and resolves timezone names.

pub mod loader;

pub use loader::{
    load_config, log_config_summary, parse_config, resolve_slots, resolve_zone, ConfigError,
    DaemonConfig,
};
