//! GPIO character device lines
//!
//! Lines are addressed by name from the configuration. A name that parses
//! as an integer is an offset on the default chip; anything else is looked
//! up by line label across every chip.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use gpiocdev::line::{EdgeDetection, Offset, Value};
use gpiocdev::Request;
use log::{debug, info};
use regulator_core::config::TriggerTiming;
use regulator_core::supervisor::PinResolver;
use regulator_hal::{Level, OutputPin, TriggerInput};
use thiserror::Error;

/// Chip numeric line names refer to
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// Consumer label shown by `gpioinfo`
pub const CONSUMER: &str = "regulator";

/// Pause after a failed edge read before the thread reads again
const EDGE_RETRY: Duration = Duration::from_millis(100);

/// GPIO errors
#[derive(Debug, Error)]
pub enum GpioError {
    /// No chip carries a line with this label
    #[error("no GPIO line named {0:?}")]
    LineNotFound(String),
    /// Character device request or ioctl failed
    #[error("GPIO request failed: {0}")]
    Cdev(#[from] gpiocdev::Error),
    /// The edge thread reported a failed read
    #[error("edge event read failed")]
    EdgeRead,
    /// The edge thread could not be started
    #[error("could not spawn edge thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// Chip and offset of a resolved line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAddress {
    pub chip: PathBuf,
    pub offset: Offset,
}

impl LineAddress {
    /// Resolve a configured line name
    pub fn resolve(name: &str, default_chip: &str) -> Result<Self, GpioError> {
        if let Ok(offset) = name.trim().parse::<Offset>() {
            return Ok(Self {
                chip: PathBuf::from(default_chip),
                offset,
            });
        }
        let found =
            gpiocdev::find_named_line(name).ok_or_else(|| GpioError::LineNotFound(name.into()))?;
        Ok(Self {
            chip: found.chip,
            offset: found.info.offset,
        })
    }
}

fn to_value(level: Level) -> Value {
    match level {
        Level::High => Value::Active,
        Level::Low => Value::Inactive,
    }
}

fn to_level(value: Value) -> Level {
    match value {
        Value::Active => Level::High,
        Value::Inactive => Level::Low,
    }
}

/// Requested output line
pub struct LinuxOutput {
    request: Request,
    offset: Offset,
}

impl LinuxOutput {
    /// Request the line as an output already driven to `initial`
    pub fn request(address: &LineAddress, initial: Level) -> Result<Self, GpioError> {
        let request = Request::builder()
            .on_chip(&address.chip)
            .with_consumer(CONSUMER)
            .with_line(address.offset)
            .as_output(to_value(initial))
            .request()?;
        Ok(Self {
            request,
            offset: address.offset,
        })
    }
}

impl OutputPin for LinuxOutput {
    type Error = GpioError;

    fn set_level(&mut self, level: Level) -> Result<(), GpioError> {
        self.request.set_value(self.offset, to_value(level))?;
        Ok(())
    }
}

/// What the edge thread saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeEvent {
    Rising,
    ReadFailed,
}

type EdgeSignal = Signal<CriticalSectionRawMutex, EdgeEvent>;

/// Rising-edge input line with kernel debounce
///
/// A background thread blocks on the line's edge events and signals each
/// one to the async side. Edges that arrive while nobody is waiting are
/// discarded when the next wait begins.
pub struct LinuxTrigger {
    request: Arc<Request>,
    offset: Offset,
    edges: Arc<EdgeSignal>,
}

impl LinuxTrigger {
    pub fn request(address: &LineAddress, debounce: Duration) -> Result<Self, GpioError> {
        let request = Request::builder()
            .on_chip(&address.chip)
            .with_consumer(CONSUMER)
            .with_line(address.offset)
            .as_input()
            .with_edge_detection(EdgeDetection::RisingEdge)
            .with_debounce_period(debounce)
            .request()?;
        let request = Arc::new(request);
        let edges = Arc::new(EdgeSignal::new());

        let reader = request.clone();
        let sink = edges.clone();
        let offset = address.offset;
        thread::Builder::new()
            .name(format!("edge-{}", offset))
            .spawn(move || loop {
                match reader.read_edge_event() {
                    Ok(_) => sink.signal(EdgeEvent::Rising),
                    Err(e) => {
                        debug!("edge read on line {}: {}", offset, e);
                        sink.signal(EdgeEvent::ReadFailed);
                        thread::sleep(EDGE_RETRY);
                    }
                }
            })?;

        Ok(Self {
            request,
            offset,
            edges,
        })
    }
}

impl TriggerInput for LinuxTrigger {
    type Error = GpioError;

    async fn wait_for_rising_edge(&mut self) -> Result<(), GpioError> {
        self.edges.reset();
        match self.edges.wait().await {
            EdgeEvent::Rising => Ok(()),
            EdgeEvent::ReadFailed => Err(GpioError::EdgeRead),
        }
    }

    fn level(&mut self) -> Result<Level, GpioError> {
        Ok(to_level(self.request.value(self.offset)?))
    }
}

/// Resolver from configured names to character device lines
pub struct LinuxPins {
    default_chip: String,
}

impl Default for LinuxPins {
    fn default() -> Self {
        Self::new(DEFAULT_CHIP)
    }
}

impl LinuxPins {
    pub fn new(default_chip: &str) -> Self {
        Self {
            default_chip: default_chip.into(),
        }
    }
}

impl PinResolver for LinuxPins {
    type Output = LinuxOutput;
    type Trigger = LinuxTrigger;
    type Error = GpioError;

    fn output(&mut self, name: &str, initial: Level) -> Result<LinuxOutput, GpioError> {
        let address = LineAddress::resolve(name, &self.default_chip)?;
        info!("Output line {} -> {}:{}", name, address.chip.display(), address.offset);
        LinuxOutput::request(&address, initial)
    }

    fn trigger(&mut self, name: &str, timing: &TriggerTiming) -> Result<LinuxTrigger, GpioError> {
        let address = LineAddress::resolve(name, &self.default_chip)?;
        info!("Trigger line {} -> {}:{}", name, address.chip.display(), address.offset);
        let debounce = Duration::from_micros(timing.denoise().as_micros());
        LinuxTrigger::request(&address, debounce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_name_is_offset() {
        let address = LineAddress::resolve("17", DEFAULT_CHIP).unwrap();
        assert_eq!(address.chip, PathBuf::from("/dev/gpiochip0"));
        assert_eq!(address.offset, 17);

        let address = LineAddress::resolve(" 5 ", "/dev/gpiochip4").unwrap();
        assert_eq!(address.chip, PathBuf::from("/dev/gpiochip4"));
        assert_eq!(address.offset, 5);
    }

    #[test]
    fn test_level_value_mapping() {
        assert_eq!(to_value(Level::High), Value::Active);
        assert_eq!(to_value(Level::Low), Value::Inactive);
        assert_eq!(to_level(to_value(Level::High)), Level::High);
        assert_eq!(to_level(Value::Inactive), Level::Low);
    }
}
