//! Test doubles for the HAL traits

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use chrono::{DateTime, TimeDelta, Utc};
use embassy_time::Instant;
use regulator_hal::{Level, OutputPin, TriggerInput, UartTx, WallClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// One recorded line write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub pin: &'static str,
    pub level: Level,
    pub at: Instant,
}

pub type PinLog = Rc<RefCell<Vec<PinWrite>>>;

pub fn pin_log() -> PinLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Output line appending every write to a shared log
pub struct MockPin {
    name: &'static str,
    log: PinLog,
    fail: bool,
}

impl MockPin {
    pub fn new(name: &'static str, log: &PinLog) -> Self {
        Self {
            name,
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(name: &'static str, log: &PinLog) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }
}

impl OutputPin for MockPin {
    type Error = MockError;

    fn set_level(&mut self, level: Level) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.log.borrow_mut().push(PinWrite {
            pin: self.name,
            level,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// What the next edge wait reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Edge, input still high after settling
    Asserted,
    /// Edge, input back low after settling
    Bounce,
    /// Edge read failed
    Glitch,
}

/// Trigger input replaying a fixed script, then never firing again
pub struct ScriptedTrigger {
    script: VecDeque<Edge>,
    current: Level,
    pub waits: Rc<Cell<usize>>,
}

impl ScriptedTrigger {
    pub fn new(script: &[Edge]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            current: Level::Low,
            waits: Rc::new(Cell::new(0)),
        }
    }
}

impl TriggerInput for ScriptedTrigger {
    type Error = MockError;

    async fn wait_for_rising_edge(&mut self) -> Result<(), MockError> {
        self.waits.set(self.waits.get() + 1);
        match self.script.pop_front() {
            Some(Edge::Asserted) => {
                self.current = Level::High;
                Ok(())
            }
            Some(Edge::Bounce) => {
                self.current = Level::Low;
                Ok(())
            }
            Some(Edge::Glitch) => Err(MockError),
            None => core::future::pending().await,
        }
    }

    fn level(&mut self) -> Result<Level, MockError> {
        Ok(self.current)
    }
}

/// Serial transmitter recording every write with its timestamp
pub struct RecordingLink {
    pub sent: Rc<RefCell<Vec<(Vec<u8>, Instant)>>>,
    pub fail: bool,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self {
            sent: Rc::new(RefCell::new(Vec::new())),
            fail: false,
        }
    }
}

impl UartTx for RecordingLink {
    type Error = MockError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), MockError> {
        // Failed writes are still recorded so tests can see the attempt
        self.sent.borrow_mut().push((data.to_vec(), Instant::now()));
        if self.fail {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

/// Wall clock starting at a chosen instant and advancing with the timer
pub struct RunningClock {
    base: DateTime<Utc>,
    started: Instant,
}

impl RunningClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            started: Instant::now(),
        }
    }
}

impl WallClock for RunningClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + TimeDelta::microseconds(self.started.elapsed().as_micros() as i64)
    }
}

/// Wall clock frozen at one instant
#[derive(Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
