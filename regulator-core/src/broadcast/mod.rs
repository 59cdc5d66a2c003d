//! Slave clock broadcaster
//!
//! Keeps the bank of slave faces in step over the shared serial line. Once
//! a minute, a fixed lead before the boundary, every slave is told to
//! advance, then each slot gets its absolute time so a face that missed an
//! increment corrects itself within the minute.
//!
//! The broadcaster is the only writer on the line and owns its transmit
//! half outright.

pub mod slots;

pub use slots::{SlotError, TimezoneSlot, TimezoneSlots};

use chrono::{DateTime, TimeZone, Utc};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use log::{info, warn};
use regulator_hal::{UartTx, WallClock};
use regulator_protocol::{increment_lead, SlaveMessage, MAX_SLOTS, MESSAGE_SPACING};

use crate::config::BroadcastConfig;
use crate::time::{increment_deadline, to_time_delta, to_timer_duration};

/// Pacing of the broadcast cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastTiming {
    /// Quiet time after every message
    pub spacing: Duration,
    /// How far before the minute boundary the increment goes out
    pub increment_lead: Duration,
    /// Delay before the startup set rounds
    pub startup_delay: Duration,
    /// How far ahead of the send instant set messages are stamped
    pub lookahead: Duration,
}

impl Default for BroadcastTiming {
    fn default() -> Self {
        Self {
            spacing: Duration::from_millis(MESSAGE_SPACING.as_millis() as u64),
            increment_lead: Duration::from_millis(increment_lead().as_millis() as u64),
            startup_delay: Duration::from_millis(200),
            lookahead: Duration::from_secs(1),
        }
    }
}

impl From<&BroadcastConfig> for BroadcastTiming {
    fn from(config: &BroadcastConfig) -> Self {
        Self {
            spacing: Duration::from_millis(config.spacing_ms as u64),
            increment_lead: Duration::from_millis(config.increment_lead_ms as u64),
            startup_delay: Duration::from_millis(config.startup_delay_ms as u64),
            lookahead: Duration::from_millis(config.lookahead_ms as u64),
        }
    }
}

/// Minute-paced sender of increment and set messages
pub struct Broadcaster<L: UartTx, C: WallClock, Z: TimeZone> {
    link: L,
    clock: C,
    slots: TimezoneSlots<Z>,
    timing: BroadcastTiming,
    last_deadline: Option<DateTime<Utc>>,
}

impl<L: UartTx, C: WallClock, Z: TimeZone> Broadcaster<L, C, Z> {
    pub fn new(link: L, clock: C, slots: TimezoneSlots<Z>, timing: BroadcastTiming) -> Self {
        Self {
            link,
            clock,
            slots,
            timing,
            last_deadline: None,
        }
    }

    pub fn slots(&self) -> &TimezoneSlots<Z> {
        &self.slots
    }

    /// Set messages for every slot at `at`, in slot order
    pub fn round_messages(&self, at: &DateTime<Utc>) -> Vec<SlaveMessage, MAX_SLOTS> {
        self.slots.iter().map(|slot| slot.set_message(at)).collect()
    }

    /// Write one message, then hold the line quiet for the spacing
    ///
    /// A failed write is logged and otherwise ignored: the next set round
    /// corrects whatever the slaves missed.
    pub async fn send(&mut self, message: &SlaveMessage) {
        match message.encode() {
            Ok(bytes) => {
                info!(
                    "  -> Sending: {}",
                    core::str::from_utf8(&bytes).unwrap_or("<non-ascii>")
                );
                if let Err(e) = self.link.write_blocking(&bytes) {
                    warn!("Serial write failed: {:?}", e);
                }
            }
            Err(e) => warn!("Dropping unencodable message {:?}: {}", message, e),
        }
        Timer::after(self.timing.spacing).await;
    }

    /// Send one set message per slot
    ///
    /// Every slot is stamped from the same instant, read once before the
    /// first message and pushed forward by the lookahead so faces land on
    /// the time current when the round finishes.
    pub async fn send_round(&mut self) {
        let at = self.clock.now() + to_time_delta(self.timing.lookahead);
        for message in self.round_messages(&at) {
            self.send(&message).await;
        }
    }

    /// Settle, then bring every face to the current time twice over
    pub async fn startup(&mut self) {
        Timer::after(self.timing.startup_delay).await;
        self.send_round().await;
        self.send_round().await;
    }

    /// When the next increment must go out
    ///
    /// May lie in the past when started inside the lead window, in which
    /// case the cycle fires at once. Never returns the deadline that
    /// already fired.
    pub fn next_deadline(&self) -> DateTime<Utc> {
        let lead = to_time_delta(self.timing.increment_lead);
        let now = self.clock.now();
        let reference = match self.last_deadline {
            // The boundary the last increment was for
            Some(previous) if previous + lead > now => previous + lead,
            _ => now,
        };
        increment_deadline(&reference, lead)
    }

    /// Wait for the next deadline and run one increment cycle
    ///
    /// Returns the deadline that fired.
    pub async fn run_cycle(&mut self) -> DateTime<Utc> {
        let deadline = self.next_deadline();
        let remaining = deadline.signed_duration_since(self.clock.now());
        Timer::after(to_timer_duration(remaining)).await;

        info!("Increment loop");
        self.send(&SlaveMessage::Increment).await;
        self.send_round().await;
        self.last_deadline = Some(deadline);
        deadline
    }

    /// Startup rounds, then one cycle per minute forever
    pub async fn run(mut self) {
        self.startup().await;
        loop {
            self.run_cycle().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, RecordingLink, RunningClock};
    use chrono::{FixedOffset, TimeDelta};
    use embassy_futures::block_on;
    use embassy_futures::select::select;

    fn utc(h: u32, m: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 30, h, m, s).unwrap() + TimeDelta::milliseconds(ms)
    }

    fn offset_slots() -> TimezoneSlots<FixedOffset> {
        let mut slots = TimezoneSlots::new();
        // Offsets in minutes east, one per slot
        let offsets = [60, 120, 180, 480, 540, -420, -240, 0];
        for (index, minutes) in offsets.into_iter().enumerate() {
            let zone = FixedOffset::east_opt(minutes * 60).unwrap();
            slots.push(index as u8, zone).unwrap();
        }
        slots
    }

    fn fast_timing() -> BroadcastTiming {
        BroadcastTiming {
            spacing: Duration::from_millis(10),
            increment_lead: Duration::from_millis(50),
            startup_delay: Duration::from_millis(10),
            lookahead: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_round_messages_each_zone() {
        let link = RecordingLink::new();
        let clock = FixedClock(utc(0, 0, 0, 0));
        let broadcaster = Broadcaster::new(link, clock, offset_slots(), fast_timing());

        let at = utc(6, 7, 0, 0);
        let bytes: std::vec::Vec<_> = broadcaster
            .round_messages(&at)
            .iter()
            .map(|m| m.encode().unwrap().to_vec())
            .collect();

        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0], b"S07070"); // 07:07
        assert_eq!(bytes[3], b"S37041"); // 14:07
        assert_eq!(bytes[5], b"S57032"); // 23:07 the previous day
        assert_eq!(bytes[7], b"S77060"); // 06:07
    }

    #[test]
    fn test_default_timing() {
        let timing = BroadcastTiming::default();
        assert_eq!(timing.spacing, Duration::from_millis(100));
        assert_eq!(timing.increment_lead, Duration::from_millis(50));
        assert_eq!(BroadcastTiming::from(&BroadcastConfig::default()), timing);
    }

    #[test]
    fn test_deadline_inside_lead_window_is_past() {
        let clock = FixedClock(utc(12, 0, 59, 980));
        let broadcaster =
            Broadcaster::new(RecordingLink::new(), clock, offset_slots(), fast_timing());

        let deadline = broadcaster.next_deadline();
        assert_eq!(deadline, utc(12, 0, 59, 950));
        assert!(to_timer_duration(deadline - utc(12, 0, 59, 980)) == Duration::from_ticks(0));
    }

    #[test]
    fn test_deadline_never_repeats() {
        let clock = FixedClock(utc(12, 0, 59, 949));
        let mut broadcaster =
            Broadcaster::new(RecordingLink::new(), clock, offset_slots(), fast_timing());
        broadcaster.last_deadline = Some(utc(12, 0, 59, 950));

        assert_eq!(broadcaster.next_deadline(), utc(12, 1, 59, 950));
    }

    #[test]
    fn test_cycle_order_and_spacing() {
        let link = RecordingLink::new();
        let sent = link.sent.clone();
        // 100 ms before the boundary, so the increment is due in 50 ms
        let clock = RunningClock::starting_at(utc(12, 0, 59, 900));
        let mut broadcaster = Broadcaster::new(link, clock, offset_slots(), fast_timing());

        let deadline = block_on(broadcaster.run_cycle());
        assert_eq!(deadline, utc(12, 0, 59, 950));

        let sent = sent.borrow();
        assert_eq!(sent.len(), 9);
        assert_eq!(sent[0].0, b"SE");
        let t = sent[0].1;
        for (k, (bytes, at)) in sent.iter().enumerate().skip(1) {
            let message = SlaveMessage::parse(bytes).unwrap();
            let SlaveMessage::Set { slot, time } = message else {
                panic!("expected set, got {:?}", message);
            };
            assert_eq!(slot as usize, k - 1);
            assert!(at.duration_since(t) >= Duration::from_millis(10) * k as u32);
            // Stamped one second ahead: 12:01 UTC in each zone
            let slot_zone = broadcaster.slots().iter().nth(k - 1).unwrap();
            assert_eq!(time, slot_zone.wall_time(&utc(12, 1, 0, 0)));
        }
    }

    #[test]
    fn test_startup_sends_two_rounds() {
        let link = RecordingLink::new();
        let sent = link.sent.clone();
        let clock = FixedClock(utc(9, 30, 10, 0));
        let mut broadcaster = Broadcaster::new(link, clock, offset_slots(), fast_timing());

        block_on(broadcaster.startup());

        let link_messages: std::vec::Vec<_> =
            sent.borrow().iter().map(|(m, _)| m.clone()).collect();
        assert_eq!(link_messages.len(), 16);
        assert_eq!(link_messages[..8], link_messages[8..]);
        assert!(link_messages.iter().all(|m| m != b"SE"));
        assert_eq!(link_messages[0], b"S00301"); // 10:30 in UTC+1
    }

    #[test]
    fn test_run_sends_startup_rounds_before_first_increment() {
        let link = RecordingLink::new();
        let sent = link.sent.clone();
        let start = embassy_time::Instant::now();
        // The first increment is due 450 ms in, well after both startup rounds
        let clock = RunningClock::starting_at(utc(12, 0, 59, 500));
        let broadcaster = Broadcaster::new(link, clock, offset_slots(), fast_timing());

        block_on(select(broadcaster.run(), Timer::after(Duration::from_millis(700))));

        let sent = sent.borrow();
        assert_eq!(sent.len(), 25);
        assert!(sent[..16].iter().all(|(m, _)| m != b"SE"));
        assert_eq!(sent[16].0, b"SE");
        assert!(sent[16].1.duration_since(start) >= Duration::from_millis(450));
        for (k, (bytes, _)) in sent[17..].iter().enumerate() {
            let message = SlaveMessage::parse(bytes).unwrap();
            assert!(matches!(message, SlaveMessage::Set { slot, .. } if slot as usize == k));
        }
    }

    #[test]
    fn test_write_errors_are_not_fatal() {
        let mut link = RecordingLink::new();
        link.fail = true;
        let sent = link.sent.clone();
        let clock = RunningClock::starting_at(utc(12, 0, 59, 940));
        let mut broadcaster = Broadcaster::new(link, clock, offset_slots(), fast_timing());

        block_on(broadcaster.run_cycle());
        assert_eq!(sent.borrow().len(), 9);
    }
}
