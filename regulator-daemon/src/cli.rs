//! Command-line options
//!
//! Every option overrides the matching value of the loaded configuration
//! file. Switches can only turn a feature on.

use std::path::PathBuf;

use clap::Parser;
use regulator_core::hand::HandKind;

use crate::config::{ConfigError, DaemonConfig};

#[derive(Debug, Default, Parser)]
#[command(name = "regulator", version, about = "Master clock pulse and slave clock controller")]
pub struct Cli {
    /// Configuration file (defaults to the embedded configuration)
    #[arg(short, long, env = "REGULATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable GPIO pulses based on time of day
    #[arg(long)]
    pub gpio_enabled: bool,

    /// Seconds alternating pin
    #[arg(long, value_name = "LINE")]
    pub gpio_seconds_a_pin: Option<String>,
    /// Seconds pulsing pin
    #[arg(long, value_name = "LINE")]
    pub gpio_seconds_pulse_pin: Option<String>,
    /// Seconds trigger pin
    #[arg(long, value_name = "LINE")]
    pub gpio_seconds_trigger: Option<String>,

    /// Minutes alternating pin
    #[arg(long, value_name = "LINE")]
    pub gpio_minutes_a_pin: Option<String>,
    /// Minutes pulsing pin
    #[arg(long, value_name = "LINE")]
    pub gpio_minutes_pulse_pin: Option<String>,
    /// Minutes trigger pin
    #[arg(long, value_name = "LINE")]
    pub gpio_minutes_trigger: Option<String>,

    /// Hours alternating pin
    #[arg(long, value_name = "LINE")]
    pub gpio_hours_a_pin: Option<String>,
    /// Hours pulsing pin
    #[arg(long, value_name = "LINE")]
    pub gpio_hours_pulse_pin: Option<String>,
    /// Hours trigger pin
    #[arg(long, value_name = "LINE")]
    pub gpio_hours_trigger: Option<String>,

    /// Pulse duration, in milliseconds
    #[arg(long, value_name = "MS")]
    pub gpio_pulse_duration: Option<u32>,

    /// Invert pulse polarity
    #[arg(long)]
    pub gpio_invert_polarity: bool,

    /// Timezone the hands are aligned to
    #[arg(long, value_name = "ZONE")]
    pub gpio_timezone: Option<String>,

    /// Serial device the slave clocks hang off
    #[arg(long, value_name = "DEVICE")]
    pub serial: Option<String>,
}

fn fit<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(value).map_err(|_| ConfigError::TooLong {
        field,
        value: value.into(),
    })?;
    Ok(out)
}

impl Cli {
    fn hand_overrides(
        &self,
        kind: HandKind,
    ) -> [(&'static str, Option<&String>); 3] {
        match kind {
            HandKind::Seconds => [
                ("direction", self.gpio_seconds_a_pin.as_ref()),
                ("pulse", self.gpio_seconds_pulse_pin.as_ref()),
                ("trigger", self.gpio_seconds_trigger.as_ref()),
            ],
            HandKind::Minutes => [
                ("direction", self.gpio_minutes_a_pin.as_ref()),
                ("pulse", self.gpio_minutes_pulse_pin.as_ref()),
                ("trigger", self.gpio_minutes_trigger.as_ref()),
            ],
            HandKind::Hours => [
                ("direction", self.gpio_hours_a_pin.as_ref()),
                ("pulse", self.gpio_hours_pulse_pin.as_ref()),
                ("trigger", self.gpio_hours_trigger.as_ref()),
            ],
        }
    }

    /// Apply the given options on top of `config`, then re-validate
    pub fn apply(&self, config: &mut DaemonConfig) -> Result<(), ConfigError> {
        let pulser = &mut config.pulser;
        if self.gpio_enabled {
            pulser.enabled = true;
        }
        if self.gpio_invert_polarity {
            pulser.invert_polarity = true;
        }
        if let Some(ms) = self.gpio_pulse_duration {
            pulser.pulse_ms = ms;
        }
        if let Some(zone) = &self.gpio_timezone {
            pulser.timezone = fit("timezone", zone)?;
        }

        for kind in HandKind::ALL {
            let [direction, pulse, trigger] = self.hand_overrides(kind);
            let pins = pulser.pins_mut(kind);
            if let (field, Some(name)) = direction {
                pins.direction = fit(field, name)?;
            }
            if let (field, Some(name)) = pulse {
                pins.pulse = fit(field, name)?;
            }
            if let (field, Some(name)) = trigger {
                pins.trigger = fit(field, name)?;
            }
        }

        if let Some(device) = &self.serial {
            config.serial.device = device.clone();
        }
        config.validate()
    }
}
