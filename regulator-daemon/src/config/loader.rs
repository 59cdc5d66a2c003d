//! Configuration file handling
//!
//! The embedded `regulator.toml` is used unless a file is named on the
//! command line. Invalid files are fatal; an unknown slot timezone only
//! drops that slot.

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use regulator_core::broadcast::{SlotError, TimezoneSlots};
use regulator_core::config::{BroadcastConfig, PulserConfig};
use regulator_core::hand::HandKind;
use regulator_hal::UartConfig;

/// Embedded default configuration
///
/// Edit regulator.toml and rebuild to change the defaults.
pub const EMBEDDED_CONFIG: &str = include_str!("../../regulator.toml");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Syntax error or a value of the wrong shape
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Slot table rejected
    #[error("invalid slot table: {0}")]
    Slot(#[from] SlotError),
    /// Pulse hold of zero
    #[error("pulse duration must be at least 1 ms")]
    ZeroPulse,
    /// A name from the command line does not fit its field
    #[error("{field} {value:?} is too long")]
    TooLong { field: &'static str, value: String },
}

/// Serial line settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path
    pub device: String,
    /// Line speed
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".into(),
            baud: regulator_protocol::BAUD_RATE,
        }
    }
}

impl SerialConfig {
    pub fn uart(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baud,
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub serial: SerialConfig,
    pub pulser: PulserConfig,
    pub broadcast: BroadcastConfig,
}

impl DaemonConfig {
    /// Reject values no component could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulser.pulse_ms == 0 {
            return Err(ConfigError::ZeroPulse);
        }
        // Index checks only: zones are resolved later, per slot
        let mut seen = TimezoneSlots::new();
        for slot in &self.broadcast.slots {
            seen.push(slot.index, chrono::Utc)?;
        }
        Ok(())
    }
}

/// Parse and validate a configuration document
pub fn parse_config(text: &str) -> Result<DaemonConfig, ConfigError> {
    let config: DaemonConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load the named file, or the embedded default
pub fn load_config(path: Option<&Path>) -> Result<DaemonConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&text)?
        }
        None => {
            info!("Using embedded configuration");
            parse_config(EMBEDDED_CONFIG)?
        }
    };
    Ok(config)
}

/// Resolve an IANA timezone name
pub fn resolve_zone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Build the slot table, dropping slots whose zone is unknown
///
/// The remaining slots keep their configured order and index.
pub fn resolve_slots(config: &BroadcastConfig) -> Result<TimezoneSlots<Tz>, ConfigError> {
    let mut slots = TimezoneSlots::new();
    for slot in &config.slots {
        match resolve_zone(&slot.timezone) {
            Some(zone) => slots.push(slot.index, zone)?,
            None => error!(
                "Unknown timezone {:?} for slot {}, slot disabled",
                slot.timezone.as_str(),
                slot.index
            ),
        }
    }
    Ok(slots)
}

/// Log the settings the daemon is about to run with
pub fn log_config_summary(config: &DaemonConfig) {
    info!(
        "Serial {} at {} baud, {} slots",
        config.serial.device,
        config.serial.baud,
        config.broadcast.slots.len()
    );
    let pulser = &config.pulser;
    if pulser.enabled {
        info!(
            "Pulser enabled: {} ms pulses, {:?} polarity, aligned to {}",
            pulser.pulse_ms,
            pulser.polarity(),
            pulser.timezone.as_str()
        );
        for kind in HandKind::ALL {
            let pins = pulser.pins(kind);
            debug!(
                "  {} hand: direction={} pulse={} trigger={}",
                kind,
                pins.direction.as_str(),
                pins.pulse.as_str(),
                pins.trigger.as_str()
            );
        }
    } else {
        info!("Pulser disabled");
    }
}
