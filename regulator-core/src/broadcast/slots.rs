//! Slave clock timezone slots

use chrono::{DateTime, TimeZone, Timelike, Utc};
use heapless::Vec;
use regulator_protocol::{SlaveMessage, WallTime, MAX_SLOTS};
use thiserror::Error;

/// Errors building the slot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("slot index {0} out of range (0-7)")]
    IndexOutOfRange(u8),
    #[error("slot index {0} used twice")]
    DuplicateIndex(u8),
}

/// One slave face and the zone it displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneSlot<Z: TimeZone> {
    pub index: u8,
    pub zone: Z,
}

impl<Z: TimeZone> TimezoneSlot<Z> {
    /// Hour and minute this face should show at `at`
    pub fn wall_time(&self, at: &DateTime<Utc>) -> WallTime {
        let local = at.with_timezone(&self.zone);
        WallTime {
            hour: local.hour() as u8,
            minute: local.minute() as u8,
        }
    }

    /// Set message for this face at `at`
    pub fn set_message(&self, at: &DateTime<Utc>) -> SlaveMessage {
        SlaveMessage::Set {
            slot: self.index,
            time: self.wall_time(at),
        }
    }
}

/// Ordered slot table
///
/// Insertion order is transmission order. Indices are unique and fit the
/// single-digit wire field.
#[derive(Debug, Clone)]
pub struct TimezoneSlots<Z: TimeZone> {
    slots: Vec<TimezoneSlot<Z>, MAX_SLOTS>,
}

impl<Z: TimeZone> Default for TimezoneSlots<Z> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Z: TimeZone> TimezoneSlots<Z> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a slot after the existing ones
    pub fn push(&mut self, index: u8, zone: Z) -> Result<(), SlotError> {
        if index as usize >= MAX_SLOTS {
            return Err(SlotError::IndexOutOfRange(index));
        }
        if self.slots.iter().any(|s| s.index == index) {
            return Err(SlotError::DuplicateIndex(index));
        }
        // A full table already holds every in-range index
        let _ = self.slots.push(TimezoneSlot { index, zone });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimezoneSlot<Z>> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn hours(h: i32) -> FixedOffset {
        FixedOffset::east_opt(h * 3600).unwrap()
    }

    #[test]
    fn test_push_validation() {
        let mut slots = TimezoneSlots::new();
        assert_eq!(slots.push(8, hours(0)), Err(SlotError::IndexOutOfRange(8)));
        slots.push(3, hours(0)).unwrap();
        assert_eq!(slots.push(3, hours(1)), Err(SlotError::DuplicateIndex(3)));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_full_table_rejects_any_index() {
        let mut slots = TimezoneSlots::new();
        for index in 0..MAX_SLOTS as u8 {
            slots.push(index, hours(0)).unwrap();
        }
        assert_eq!(slots.push(4, hours(2)), Err(SlotError::DuplicateIndex(4)));
        assert_eq!(slots.push(9, hours(2)), Err(SlotError::IndexOutOfRange(9)));
        assert_eq!(slots.len(), MAX_SLOTS);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut slots = TimezoneSlots::new();
        for index in [5, 0, 7, 2] {
            slots.push(index, hours(0)).unwrap();
        }
        let order: std::vec::Vec<u8> = slots.iter().map(|s| s.index).collect();
        assert_eq!(order, [5, 0, 7, 2]);
    }

    #[test]
    fn test_wall_time_per_zone() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 22, 45, 30).unwrap();
        let tokyo = TimezoneSlot { index: 4, zone: hours(9) };
        let la = TimezoneSlot { index: 5, zone: hours(-8) };

        assert_eq!(tokyo.wall_time(&at), WallTime { hour: 7, minute: 45 });
        assert_eq!(la.wall_time(&at), WallTime { hour: 14, minute: 45 });
        assert_eq!(
            la.set_message(&at).encode().unwrap().as_slice(),
            b"S55441"
        );
    }
}
