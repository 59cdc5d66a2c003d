//! Pulse actuator loop
//!
//! The actuator owns a hand's two output lines and is the only consumer of
//! its request queue. Each request becomes one full pulse followed by a
//! direction flip, and the next request is not taken until that sequence
//! has finished.

use embassy_time::Timer;
use log::{debug, warn};
use regulator_hal::{Level, OutputPin};

use super::{Direction, HandKind, PulseShape};
use crate::queue::{ActuationRequest, QueueReceiver};

/// Pulse generator for one hand
pub struct HandActuator<O: OutputPin> {
    kind: HandKind,
    pulse: O,
    direction_pin: O,
    direction: Direction,
    shape: PulseShape,
    completed: u32,
}

impl<O: OutputPin> HandActuator<O> {
    /// Take ownership of the lines and drive them to their idle state
    ///
    /// The direction line starts low and the pulse line at its released
    /// level. A write failure here means the lines are unusable.
    pub fn new(
        kind: HandKind,
        mut direction_pin: O,
        mut pulse: O,
        shape: PulseShape,
    ) -> Result<Self, O::Error> {
        let direction = Direction::default();
        direction_pin.set_level(direction.level())?;
        pulse.set_level(shape.polarity.released())?;

        Ok(Self {
            kind,
            pulse,
            direction_pin,
            direction,
            shape,
            completed: 0,
        })
    }

    pub fn kind(&self) -> HandKind {
        self.kind
    }

    /// Current alternation state
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Actuations finished since startup
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Run one pulse sequence
    ///
    /// Assert, hold, release, hold, then flip the direction line. Line
    /// write errors are logged and the sequence carries on so the
    /// alternation state stays in step with the request count.
    pub async fn actuate(&mut self, request: ActuationRequest) {
        debug!("{} actuation ({:?})", self.kind, request.source);

        self.drive_pulse(self.shape.polarity.asserted());
        Timer::after(self.shape.hold).await;
        self.drive_pulse(self.shape.polarity.released());
        Timer::after(self.shape.hold).await;

        self.direction = self.direction.flipped();
        if let Err(e) = self.direction_pin.set_level(self.direction.level()) {
            warn!("{} direction write failed: {:?}", self.kind, e);
        }
        self.completed = self.completed.wrapping_add(1);
    }

    /// Serve requests forever, strictly one at a time
    pub async fn run(mut self, mut requests: QueueReceiver<'_>) {
        loop {
            let request = requests.take().await;
            self.actuate(request).await;
        }
    }

    fn drive_pulse(&mut self, level: Level) {
        if let Err(e) = self.pulse.set_level(level) {
            warn!("{} pulse write failed: {:?}", self.kind, e);
        }
    }
}
