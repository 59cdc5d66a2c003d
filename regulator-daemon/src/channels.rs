//! Inter-task communication
//!
//! Each hand has one zero-capacity request queue. Producers (scheduler,
//! trigger watcher, hour cascade) hand requests to the actuator task of
//! that hand and wait until it has taken them.

use regulator_core::supervisor::HandQueues;

/// Request queues for the seconds, minutes and hours hands
pub static QUEUES: HandQueues = HandQueues::new();
