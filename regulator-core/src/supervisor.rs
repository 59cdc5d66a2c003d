//! Hand supervisor
//!
//! Assembles the hand subsystem once at startup: resolves each hand's lines
//! through a platform [`PinResolver`], drives them to their idle state and
//! splits every working hand into the three loops the platform spawns as
//! independent tasks. A hand whose lines cannot be resolved is disabled on
//! its own; the other hands keep running.

use core::fmt;

use chrono::TimeZone;
use heapless::Vec;
use log::{error, info, warn};
use regulator_hal::{Level, OutputPin, TriggerInput, WallClock};
use thiserror::Error;

use crate::config::{PulserConfig, TriggerTiming};
use crate::hand::{
    Cascade, Direction, HandActuator, HandKind, TriggerWatcher, WallClockScheduler,
};
use crate::queue::{QueueReceiver, RequestQueue};

/// Platform lookup from configured line names to line handles
pub trait PinResolver {
    /// Requested output line
    type Output: OutputPin;
    /// Requested edge-detecting input line
    type Trigger: TriggerInput;
    /// Lookup or request failure
    type Error: fmt::Debug;

    /// Request `name` as an output driven to `initial` from the start
    fn output(&mut self, name: &str, initial: Level) -> Result<Self::Output, Self::Error>;

    /// Request `name` as a rising-edge input filtered per `timing`
    fn trigger(&mut self, name: &str, timing: &TriggerTiming)
        -> Result<Self::Trigger, Self::Error>;
}

/// Line a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Direction,
    Pulse,
    Trigger,
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PinRole::Direction => "direction",
            PinRole::Pulse => "pulse",
            PinRole::Trigger => "trigger",
        })
    }
}

/// Why a hand could not be brought up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandConfigError {
    /// No line name configured
    #[error("{role} pin not configured")]
    Missing { role: PinRole },
    /// The platform could not provide the line
    #[error("{role} pin could not be resolved")]
    Unresolved { role: PinRole },
    /// The output lines rejected their idle levels
    #[error("output pins could not be driven to their idle state")]
    InitialState,
}

/// A hand with every line resolved and initialized
pub struct AssembledHand<O: OutputPin, T: TriggerInput> {
    pub actuator: HandActuator<O>,
    pub trigger: T,
}

/// Resolve and initialize one hand's lines
pub fn assemble_hand<R: PinResolver>(
    kind: HandKind,
    config: &PulserConfig,
    resolver: &mut R,
) -> Result<AssembledHand<R::Output, R::Trigger>, HandConfigError> {
    let pins = config.pins(kind);
    for (role, name) in [
        (PinRole::Direction, &pins.direction),
        (PinRole::Pulse, &pins.pulse),
        (PinRole::Trigger, &pins.trigger),
    ] {
        if name.is_empty() {
            return Err(HandConfigError::Missing { role });
        }
    }

    let unresolved = |role: PinRole| {
        move |e: R::Error| {
            warn!("{} {} line {:?}", kind, role, e);
            HandConfigError::Unresolved { role }
        }
    };
    // The input goes first: no output is requested for a hand that
    // cannot run, and outputs start at their idle levels.
    let trigger = resolver
        .trigger(&pins.trigger, &config.trigger)
        .map_err(unresolved(PinRole::Trigger))?;
    let shape = config.pulse_shape();
    let direction = resolver
        .output(&pins.direction, Direction::default().level())
        .map_err(unresolved(PinRole::Direction))?;
    let pulse = resolver
        .output(&pins.pulse, shape.polarity.released())
        .map_err(unresolved(PinRole::Pulse))?;

    let actuator = HandActuator::new(kind, direction, pulse, shape).map_err(|e| {
        warn!("{} idle write {:?}", kind, e);
        HandConfigError::InitialState
    })?;

    Ok(AssembledHand { actuator, trigger })
}

/// One request queue per hand
///
/// Lives in a `static` on the platform side so the loops borrowing it can
/// run as independent tasks.
pub struct HandQueues {
    pub seconds: RequestQueue,
    pub minutes: RequestQueue,
    pub hours: RequestQueue,
}

impl Default for HandQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl HandQueues {
    pub const fn new() -> Self {
        Self {
            seconds: RequestQueue::new(),
            minutes: RequestQueue::new(),
            hours: RequestQueue::new(),
        }
    }

    pub fn get(&self, kind: HandKind) -> &RequestQueue {
        match kind {
            HandKind::Seconds => &self.seconds,
            HandKind::Minutes => &self.minutes,
            HandKind::Hours => &self.hours,
        }
    }
}

/// The three loops of one hand, ready to spawn
pub struct HandUnits<'a, O: OutputPin, T: TriggerInput, C: WallClock, Z: TimeZone> {
    pub kind: HandKind,
    pub actuator: HandActuator<O>,
    pub requests: QueueReceiver<'a>,
    pub watcher: TriggerWatcher<'a, T>,
    pub scheduler: WallClockScheduler<'a, C, Z>,
}

/// The assembled hand subsystem
pub struct HandSupervisor<O: OutputPin, T: TriggerInput, Z: TimeZone> {
    seconds: Option<AssembledHand<O, T>>,
    minutes: Option<AssembledHand<O, T>>,
    hours: Option<AssembledHand<O, T>>,
    timing: TriggerTiming,
    zone: Z,
}

impl<O: OutputPin, T: TriggerInput, Z: TimeZone + Clone> HandSupervisor<O, T, Z> {
    /// Bring up every configured hand
    ///
    /// Returns `None` without touching the resolver when the subsystem is
    /// disabled. Hands that fail to come up are logged and left out.
    pub fn assemble<R>(config: &PulserConfig, zone: Z, resolver: &mut R) -> Option<Self>
    where
        R: PinResolver<Output = O, Trigger = T>,
    {
        if !config.enabled {
            info!("Pulser disabled");
            return None;
        }

        let mut bring_up = |kind: HandKind| match assemble_hand(kind, config, resolver) {
            Ok(hand) => Some(hand),
            Err(e) => {
                error!("Error initializing {} pulse pins: {}", kind, e);
                None
            }
        };

        let seconds = bring_up(HandKind::Seconds);
        let minutes = bring_up(HandKind::Minutes);
        let hours = bring_up(HandKind::Hours);

        Some(Self {
            seconds,
            minutes,
            hours,
            timing: config.trigger,
            zone,
        })
    }

    /// Whether `kind` came up
    pub fn is_running(&self, kind: HandKind) -> bool {
        self.hand(kind).is_some()
    }

    pub fn hand(&self, kind: HandKind) -> Option<&AssembledHand<O, T>> {
        match kind {
            HandKind::Seconds => self.seconds.as_ref(),
            HandKind::Minutes => self.minutes.as_ref(),
            HandKind::Hours => self.hours.as_ref(),
        }
    }

    /// Split every working hand into its loops
    ///
    /// The hour watcher catches the minute hand up only when the minute
    /// hand is running; otherwise nobody would drain the cascade.
    pub fn into_units<'a, C>(
        self,
        clock: C,
        queues: &'a HandQueues,
    ) -> Vec<HandUnits<'a, O, T, C, Z>, 3>
    where
        C: WallClock + Clone,
    {
        let minutes_running = self.minutes.is_some();
        let settle = self.timing.settle();
        let holdoff = self.timing.holdoff();
        let mut units = Vec::new();

        let hands = [
            (HandKind::Seconds, self.seconds),
            (HandKind::Minutes, self.minutes),
            (HandKind::Hours, self.hours),
        ];
        for (kind, hand) in hands {
            let Some(hand) = hand else { continue };
            let queue = queues.get(kind);
            let Some(requests) = queue.receiver() else {
                error!("{} request queue already has a consumer", kind);
                continue;
            };

            let mut watcher = TriggerWatcher::new(kind, hand.trigger, queue, settle, holdoff);
            if kind == HandKind::Hours {
                if minutes_running {
                    watcher = watcher.with_cascade(Cascade::minutes(&queues.minutes));
                } else {
                    warn!("Minutes hand disabled, hour trigger will not cascade");
                }
            }

            let scheduler = WallClockScheduler::new(kind, clock.clone(), self.zone.clone(), queue);
            // At most three hands, so this cannot overflow
            let _ = units.push(HandUnits {
                kind,
                actuator: hand.actuator,
                requests,
                watcher,
                scheduler,
            });
        }
        units
    }
}
