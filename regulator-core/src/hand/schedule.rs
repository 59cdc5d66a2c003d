//! Wall-clock scheduler
//!
//! Emits one request per unit boundary of the hand's wall clock. Instead of
//! a fixed ticker, every deadline is recomputed from a fresh reading of the
//! clock, truncated to the unit in the configured zone, so timer jitter and
//! slow handoffs never accumulate into drift.

use chrono::{DateTime, TimeZone, Utc};
use embassy_time::Timer;
use log::info;
use regulator_hal::WallClock;

use super::HandKind;
use crate::queue::{ActuationRequest, RequestQueue};
use crate::time::{next_boundary, to_timer_duration};

/// Boundary-aligned request source for one hand
pub struct WallClockScheduler<'a, C: WallClock, Z: TimeZone> {
    kind: HandKind,
    clock: C,
    zone: Z,
    queue: &'a RequestQueue,
    target: Option<DateTime<Utc>>,
}

impl<'a, C: WallClock, Z: TimeZone> WallClockScheduler<'a, C, Z> {
    pub fn new(kind: HandKind, clock: C, zone: Z, queue: &'a RequestQueue) -> Self {
        Self {
            kind,
            clock,
            zone,
            queue,
            target: None,
        }
    }

    pub fn kind(&self) -> HandKind {
        self.kind
    }

    /// The boundary the scheduler will fire at next
    ///
    /// The first boundary strictly after the current time. A timer that
    /// woke a hair early does not fire the same boundary twice: the search
    /// never starts before the boundary that already fired.
    pub fn next_deadline(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        let reference = match self.target {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        let local = reference.with_timezone(&self.zone);
        next_boundary(&local, self.kind.unit()).with_timezone(&Utc)
    }

    /// Sleep until the next boundary, then hand over one request
    ///
    /// Returns the boundary that fired.
    pub async fn fire_once(&mut self) -> DateTime<Utc> {
        let deadline = self.next_deadline();
        let remaining = deadline.signed_duration_since(self.clock.now());
        Timer::after(to_timer_duration(remaining)).await;

        self.queue.put(ActuationRequest::schedule()).await;
        info!("{} pulse sent", self.kind);
        self.target = Some(deadline);
        deadline
    }

    /// Fire at every boundary forever
    pub async fn run(mut self) {
        loop {
            self.fire_once().await;
        }
    }
}
