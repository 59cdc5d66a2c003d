//! Pulser and broadcaster configuration types
//!
//! These are the raw, name-based settings. Pins and timezones are resolved
//! against the platform once at startup and never touched again.

use embassy_time::Duration;
use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use regulator_protocol::{increment_lead, MAX_SLOTS};

use crate::hand::{HandKind, Polarity, PulseShape};

/// Maximum length of a GPIO line name
pub const MAX_PIN_NAME_LEN: usize = 32;

/// Maximum length of an IANA timezone name
pub const MAX_ZONE_NAME_LEN: usize = 40;

/// GPIO line name (numeric offset or line label)
pub type PinName = String<MAX_PIN_NAME_LEN>;

/// IANA timezone name
pub type ZoneName = String<MAX_ZONE_NAME_LEN>;

/// Default pulse hold per half cycle
pub const DEFAULT_PULSE_MS: u32 = 300;

/// Default alignment timezone for the hands
pub const DEFAULT_TIMEZONE: &str = "Europe/Helsinki";

/// Default slave clock slots, in wire order
pub const DEFAULT_SLOTS: [(u8, &str); MAX_SLOTS] = [
    (0, "Europe/Paris"),
    (1, "Europe/Helsinki"),
    (2, "Europe/Moscow"),
    (3, "Asia/Shanghai"),
    (4, "Asia/Tokyo"),
    (5, "America/Los_Angeles"),
    (6, "America/New_York"),
    (7, "Etc/GMT"),
];

/// Copy a name into a fixed-capacity string, truncating on overflow
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// GPIO line names for one hand
///
/// An empty name means the line is not configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandPinConfig {
    /// Alternating direction output
    pub direction: PinName,
    /// Pulse output
    pub pulse: PinName,
    /// Trigger (sense) input
    pub trigger: PinName,
}

impl HandPinConfig {
    /// Create a pin set from line names
    pub fn new(direction: &str, pulse: &str, trigger: &str) -> Self {
        Self {
            direction: bounded(direction),
            pulse: bounded(pulse),
            trigger: bounded(trigger),
        }
    }
}

/// Trigger input debounce and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TriggerTiming {
    /// Noise filter applied by the edge source (ms)
    pub denoise_ms: u32,
    /// Wait after an edge before sampling the input (ms)
    pub settle_ms: u32,
    /// Wait after every wake before listening again (ms)
    pub holdoff_ms: u32,
}

impl Default for TriggerTiming {
    fn default() -> Self {
        Self {
            denoise_ms: 50,
            settle_ms: 30,
            holdoff_ms: 300,
        }
    }
}

impl TriggerTiming {
    pub fn denoise(&self) -> Duration {
        Duration::from_millis(self.denoise_ms as u64)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms as u64)
    }

    pub fn holdoff(&self) -> Duration {
        Duration::from_millis(self.holdoff_ms as u64)
    }
}

/// Hand actuation configuration
///
/// Immutable once the daemon has started.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PulserConfig {
    /// Drive the hands at all
    pub enabled: bool,
    /// Pulse hold per half cycle (ms)
    pub pulse_ms: u32,
    /// Swap the asserted and released pulse levels
    pub invert_polarity: bool,
    /// Timezone the hands are aligned to
    pub timezone: ZoneName,
    /// Trigger input timing
    pub trigger: TriggerTiming,
    /// Seconds hand lines
    pub seconds: HandPinConfig,
    /// Minutes hand lines
    pub minutes: HandPinConfig,
    /// Hours hand lines
    pub hours: HandPinConfig,
}

impl Default for PulserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pulse_ms: DEFAULT_PULSE_MS,
            invert_polarity: false,
            timezone: bounded(DEFAULT_TIMEZONE),
            trigger: TriggerTiming::default(),
            seconds: HandPinConfig::new("5", "6", "17"),
            minutes: HandPinConfig::new("13", "19", "27"),
            hours: HandPinConfig::new("26", "20", "22"),
        }
    }
}

impl PulserConfig {
    /// Line names for a hand
    pub fn pins(&self, kind: HandKind) -> &HandPinConfig {
        match kind {
            HandKind::Seconds => &self.seconds,
            HandKind::Minutes => &self.minutes,
            HandKind::Hours => &self.hours,
        }
    }

    /// Mutable line names for a hand
    pub fn pins_mut(&mut self, kind: HandKind) -> &mut HandPinConfig {
        match kind {
            HandKind::Seconds => &mut self.seconds,
            HandKind::Minutes => &mut self.minutes,
            HandKind::Hours => &mut self.hours,
        }
    }

    pub fn polarity(&self) -> Polarity {
        Polarity::from_inverted(self.invert_polarity)
    }

    /// Pulse waveform shared by every hand
    pub fn pulse_shape(&self) -> PulseShape {
        PulseShape {
            hold: Duration::from_millis(self.pulse_ms as u64),
            polarity: self.polarity(),
        }
    }
}

/// One slave clock slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotConfig {
    /// Wire slot number (0-7)
    pub index: u8,
    /// IANA timezone shown on this face
    pub timezone: ZoneName,
}

/// Slave clock broadcast configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BroadcastConfig {
    /// Quiet time after every message (ms)
    pub spacing_ms: u32,
    /// How far before the minute the increment is sent (ms)
    pub increment_lead_ms: u32,
    /// Delay before the first set round (ms)
    pub startup_delay_ms: u32,
    /// How far ahead of the send instant set messages are stamped (ms)
    pub lookahead_ms: u32,
    /// Slots in wire order
    pub slots: Vec<SlotConfig, MAX_SLOTS>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        let mut slots = Vec::new();
        for (index, zone) in DEFAULT_SLOTS {
            // DEFAULT_SLOTS has exactly MAX_SLOTS entries
            let _ = slots.push(SlotConfig {
                index,
                timezone: bounded(zone),
            });
        }
        Self {
            spacing_ms: 100,
            increment_lead_ms: increment_lead().as_millis() as u32,
            startup_delay_ms: 200,
            lookahead_ms: 1000,
            slots,
        }
    }
}
