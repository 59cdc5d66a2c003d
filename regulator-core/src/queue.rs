//! Zero-capacity actuation request queue
//!
//! A [`RequestQueue`] is a rendezvous: [`RequestQueue::put`] does not
//! return until the single consumer has taken the request. A busy actuator
//! therefore stalls every producer feeding it, and no request is ever
//! dropped or buffered behind its back.
//!
//! Built from embassy-sync primitives so instances can live in `static`s
//! shared between tasks:
//! - a one-slot channel carries the request
//! - a signal reports that the consumer took it
//! - a mutex gives one producer at a time the handoff

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

/// What produced an actuation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// Wall-clock boundary crossing
    Schedule,
    /// Rising edge on the hand's own trigger input
    Trigger,
    /// Minute catch-up emitted by the hour trigger
    Cascade,
}

/// One pulse requested for a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationRequest {
    pub source: RequestSource,
}

impl ActuationRequest {
    pub const fn schedule() -> Self {
        Self {
            source: RequestSource::Schedule,
        }
    }

    pub const fn trigger() -> Self {
        Self {
            source: RequestSource::Trigger,
        }
    }

    pub const fn cascade() -> Self {
        Self {
            source: RequestSource::Cascade,
        }
    }
}

/// Rendezvous queue between request producers and one actuator
pub struct RequestQueue {
    slot: Channel<CriticalSectionRawMutex, ActuationRequest, 1>,
    taken: Signal<CriticalSectionRawMutex, ()>,
    handoff: Mutex<CriticalSectionRawMutex, ()>,
    claimed: AtomicBool,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
            taken: Signal::new(),
            handoff: Mutex::new(()),
            claimed: AtomicBool::new(false),
        }
    }

    /// Hand a request to the consumer
    ///
    /// Returns once the consumer has taken it. Dropping this future after
    /// the request entered the slot leaves it queued for the consumer.
    pub async fn put(&self, request: ActuationRequest) {
        let _turn = self.handoff.lock().await;
        self.slot.send(request).await;
        self.taken.wait().await;
    }

    /// Claim the consuming end
    ///
    /// Only the first call succeeds: a queue has exactly one reader, which
    /// is what keeps a hand's actuations in arrival order.
    pub fn receiver(&self) -> Option<QueueReceiver<'_>> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(QueueReceiver { queue: self })
        }
    }
}

/// The single consuming end of a [`RequestQueue`]
pub struct QueueReceiver<'a> {
    queue: &'a RequestQueue,
}

impl QueueReceiver<'_> {
    /// Wait for the next request and release its producer
    pub async fn take(&mut self) -> ActuationRequest {
        let request = self.queue.slot.receive().await;
        self.queue.taken.signal(());
        request
    }
}
