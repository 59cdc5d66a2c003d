//! Trigger watcher
//!
//! Converts debounced rising edges on a hand's sense input into actuation
//! requests. Every wake is followed by a settle delay, a level sample and a
//! re-arm hold-off, so a single mechanical contact closure yields at most
//! one request.
//!
//! The hour hand is special: its sense contact closes once per revolution
//! of the minute train, so an hour trigger first catches the minute hand up
//! by a full revolution, then advances the hour hand itself.

use embassy_time::{Duration, Timer};
use log::{debug, info, warn};
use regulator_hal::{Level, TriggerInput};

use super::HandKind;
use crate::queue::{ActuationRequest, RequestQueue};

/// Minute requests emitted ahead of every hour trigger request
pub const HOUR_CASCADE_LEN: u32 = 60;

/// Requests forwarded to another hand before this hand's own request
pub struct Cascade<'a> {
    pub queue: &'a RequestQueue,
    pub count: u32,
}

impl<'a> Cascade<'a> {
    /// The hour trigger's catch-up of the minute hand
    pub fn minutes(queue: &'a RequestQueue) -> Self {
        Self {
            queue,
            count: HOUR_CASCADE_LEN,
        }
    }
}

/// Edge-to-request converter for one hand
pub struct TriggerWatcher<'a, T: TriggerInput> {
    kind: HandKind,
    input: T,
    queue: &'a RequestQueue,
    cascade: Option<Cascade<'a>>,
    settle: Duration,
    holdoff: Duration,
}

impl<'a, T: TriggerInput> TriggerWatcher<'a, T> {
    pub fn new(
        kind: HandKind,
        input: T,
        queue: &'a RequestQueue,
        settle: Duration,
        holdoff: Duration,
    ) -> Self {
        Self {
            kind,
            input,
            queue,
            cascade: None,
            settle,
            holdoff,
        }
    }

    /// Emit `cascade` ahead of every request from this watcher
    pub fn with_cascade(mut self, cascade: Cascade<'a>) -> Self {
        self.cascade = Some(cascade);
        self
    }

    pub fn kind(&self) -> HandKind {
        self.kind
    }

    /// Requests forwarded to another hand per trigger
    pub fn cascade_len(&self) -> u32 {
        self.cascade.as_ref().map_or(0, |c| c.count)
    }

    /// Wait for one edge and handle it
    ///
    /// Returns whether the edge produced a request. Read errors on either
    /// the edge or the level sample count as no event.
    pub async fn poll_once(&mut self) -> bool {
        if let Err(e) = self.input.wait_for_rising_edge().await {
            debug!("{} trigger read error: {:?}", self.kind, e);
            Timer::after(self.holdoff).await;
            return false;
        }

        Timer::after(self.settle).await;
        let fired = match self.input.level() {
            Ok(Level::High) => {
                info!("{} trigger pin active", self.kind);
                self.emit().await;
                true
            }
            Ok(Level::Low) => false,
            Err(e) => {
                warn!("{} trigger sample failed: {:?}", self.kind, e);
                false
            }
        };

        Timer::after(self.holdoff).await;
        fired
    }

    /// Watch the input forever
    pub async fn run(mut self) {
        loop {
            self.poll_once().await;
        }
    }

    async fn emit(&mut self) {
        if let Some(cascade) = &self.cascade {
            for _ in 0..cascade.count {
                cascade.queue.put(ActuationRequest::cascade()).await;
            }
        }
        self.queue.put(ActuationRequest::trigger()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::RequestSource;
    use crate::testing::{Edge, ScriptedTrigger};
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::select::select;

    const SETTLE: Duration = Duration::from_millis(5);
    const HOLDOFF: Duration = Duration::from_millis(5);

    #[test]
    fn test_asserted_edge_emits_one_request() {
        let queue = RequestQueue::new();
        let mut rx = queue.receiver().unwrap();
        let trigger = ScriptedTrigger::new(&[Edge::Asserted]);
        let mut watcher = TriggerWatcher::new(HandKind::Seconds, trigger, &queue, SETTLE, HOLDOFF);

        let (fired, request) = block_on(join(watcher.poll_once(), rx.take()));
        assert!(fired);
        assert_eq!(request.source, RequestSource::Trigger);
    }

    #[test]
    fn test_bounce_and_glitch_are_ignored() {
        let queue = RequestQueue::new();
        let trigger = ScriptedTrigger::new(&[Edge::Bounce, Edge::Glitch]);
        let waits = trigger.waits.clone();
        let mut watcher = TriggerWatcher::new(HandKind::Minutes, trigger, &queue, SETTLE, HOLDOFF);

        // No consumer: an emitted request would block forever
        block_on(async {
            assert!(!watcher.poll_once().await);
            assert!(!watcher.poll_once().await);
        });
        assert_eq!(waits.get(), 2);
    }

    #[test]
    fn test_holdoff_after_every_wake() {
        let queue = RequestQueue::new();
        let trigger = ScriptedTrigger::new(&[Edge::Bounce, Edge::Bounce]);
        let holdoff = Duration::from_millis(25);
        let mut watcher = TriggerWatcher::new(HandKind::Hours, trigger, &queue, SETTLE, holdoff);

        let start = embassy_time::Instant::now();
        block_on(async {
            watcher.poll_once().await;
            watcher.poll_once().await;
        });
        assert!(start.elapsed() >= (SETTLE + holdoff) * 2);
    }

    #[test]
    fn test_hour_trigger_cascades_sixty_minutes_first() {
        let hours = RequestQueue::new();
        let minutes = RequestQueue::new();
        let mut hours_rx = hours.receiver().unwrap();
        let mut minutes_rx = minutes.receiver().unwrap();
        let trigger = ScriptedTrigger::new(&[Edge::Asserted]);
        let watcher = TriggerWatcher::new(HandKind::Hours, trigger, &hours, SETTLE, HOLDOFF)
            .with_cascade(Cascade::minutes(&minutes));

        let events = RefCell::new(std::vec::Vec::new());
        block_on(select(
            watcher.run(),
            join(
                async {
                    for _ in 0..HOUR_CASCADE_LEN {
                        let request = minutes_rx.take().await;
                        events.borrow_mut().push((HandKind::Minutes, request.source));
                    }
                },
                async {
                    let request = hours_rx.take().await;
                    events.borrow_mut().push((HandKind::Hours, request.source));
                },
            ),
        ));

        let events = events.into_inner();
        assert_eq!(events.len(), HOUR_CASCADE_LEN as usize + 1);
        assert!(events[..HOUR_CASCADE_LEN as usize]
            .iter()
            .all(|e| *e == (HandKind::Minutes, RequestSource::Cascade)));
        assert_eq!(
            events[HOUR_CASCADE_LEN as usize],
            (HandKind::Hours, RequestSource::Trigger)
        );
    }

    #[test]
    fn test_cascade_blocks_on_busy_minutes() {
        let hours = RequestQueue::new();
        let minutes = RequestQueue::new();
        let mut hours_rx = hours.receiver().unwrap();
        let mut minutes_rx = minutes.receiver().unwrap();
        let trigger = ScriptedTrigger::new(&[Edge::Asserted]);
        let watcher = TriggerWatcher::new(HandKind::Hours, trigger, &hours, SETTLE, HOLDOFF)
            .with_cascade(Cascade {
                queue: &minutes,
                count: 3,
            });

        let taken = core::cell::Cell::new(0u32);
        let hour_seen_after = core::cell::Cell::new(None);
        block_on(select(
            watcher.run(),
            join(
                async {
                    for _ in 0..3 {
                        Timer::after(Duration::from_millis(10)).await;
                        minutes_rx.take().await;
                        taken.set(taken.get() + 1);
                    }
                },
                async {
                    hours_rx.take().await;
                    hour_seen_after.set(Some(taken.get()));
                },
            ),
        ));

        // The hour request only arrives once every minute request was taken
        assert_eq!(hour_seen_after.get(), Some(3));
    }
}
