//! Message types for the slave clock protocol
//!
//! Only two messages exist, both sent from the master to every slave on the
//! line:
//! - Increment: advance the displayed minute by one
//! - Set: absolute hour and minute for one slot

use heapless::Vec;
use thiserror::Error;

/// Message prefix shared by every command
pub const MSG_PREFIX: u8 = b'S';

/// Second byte of the increment command
pub const MSG_INCREMENT: u8 = b'E';

/// Longest encoded message ('S' + slot + four digits)
pub const MAX_MESSAGE_LEN: usize = 6;

/// Number of addressable slots (single decimal digit 0-7)
pub const MAX_SLOTS: usize = 8;

/// Hour and minute shown on a slave face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Hour of day (0-23)
    pub hour: u8,
    /// Minute of hour (0-59)
    pub minute: u8,
}

impl WallTime {
    /// Create a wall time, rejecting out-of-range fields
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }
}

/// Errors that can occur while encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Slot index does not fit the single-digit slot field
    #[error("slot {0} out of range (0-7)")]
    SlotOutOfRange(u8),
    /// Hour or minute out of range
    #[error("invalid wall time {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },
}

/// Errors that can occur while parsing a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Message does not start with the command prefix
    #[error("missing 'S' prefix")]
    MissingPrefix,
    /// Message length matches no command
    #[error("unexpected message length {0}")]
    InvalidLength(usize),
    /// A field byte is not a decimal digit
    #[error("non-digit byte 0x{0:02x}")]
    InvalidDigit(u8),
    /// Digits decode to a slot or time outside the allowed range
    #[error("field out of range")]
    OutOfRange,
}

/// Messages from the master clock to the slave clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveMessage {
    /// Advance every slave by one minute
    Increment,
    /// Set the absolute time of one slot
    Set {
        slot: u8,
        time: WallTime,
    },
}

impl SlaveMessage {
    /// Create a set message, validating the slot and time
    pub fn set(slot: u8, hour: u8, minute: u8) -> Result<Self, EncodeError> {
        if slot as usize >= MAX_SLOTS {
            return Err(EncodeError::SlotOutOfRange(slot));
        }
        let time = WallTime::new(hour, minute).ok_or(EncodeError::InvalidTime { hour, minute })?;
        Ok(SlaveMessage::Set { slot, time })
    }

    /// Encode this message into its wire bytes
    ///
    /// Digits are sent ones-then-tens for both minutes and hours, so 07:04
    /// on slot 2 is `S24070`.
    pub fn encode(&self) -> Result<Vec<u8, MAX_MESSAGE_LEN>, EncodeError> {
        let mut out = Vec::new();
        match self {
            SlaveMessage::Increment => {
                // Capacity is fixed at MAX_MESSAGE_LEN, so these cannot fail
                let _ = out.extend_from_slice(&[MSG_PREFIX, MSG_INCREMENT]);
            }
            SlaveMessage::Set { slot, time } => {
                if *slot as usize >= MAX_SLOTS {
                    return Err(EncodeError::SlotOutOfRange(*slot));
                }
                if WallTime::new(time.hour, time.minute).is_none() {
                    return Err(EncodeError::InvalidTime {
                        hour: time.hour,
                        minute: time.minute,
                    });
                }
                let _ = out.extend_from_slice(&[
                    MSG_PREFIX,
                    digit(*slot),
                    digit(time.minute % 10),
                    digit(time.minute / 10),
                    digit(time.hour % 10),
                    digit(time.hour / 10),
                ]);
            }
        }
        Ok(out)
    }

    /// Parse a message from its wire bytes (for testing or simulation)
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        match bytes {
            [MSG_PREFIX, MSG_INCREMENT] => Ok(SlaveMessage::Increment),
            [MSG_PREFIX, slot, m1, m10, h1, h10] => {
                let slot = value(*slot)?;
                let minute = value(*m10)? * 10 + value(*m1)?;
                let hour = value(*h10)? * 10 + value(*h1)?;
                SlaveMessage::set(slot, hour, minute).map_err(|_| DecodeError::OutOfRange)
            }
            [] => Err(DecodeError::InvalidLength(0)),
            [first, ..] if *first != MSG_PREFIX => Err(DecodeError::MissingPrefix),
            other => Err(DecodeError::InvalidLength(other.len())),
        }
    }
}

fn digit(n: u8) -> u8 {
    b'0' + n
}

fn value(byte: u8) -> Result<u8, DecodeError> {
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(DecodeError::InvalidDigit(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_increment_bytes() {
        let bytes = SlaveMessage::Increment.encode().unwrap();
        assert_eq!(&bytes[..], b"SE");
    }

    #[test]
    fn test_set_digit_order() {
        let bytes = SlaveMessage::set(2, 7, 4).unwrap().encode().unwrap();
        assert_eq!(&bytes[..], b"S24070");

        let bytes = SlaveMessage::set(3, 14, 7).unwrap().encode().unwrap();
        assert_eq!(&bytes[..], b"S37041");
    }

    #[test]
    fn test_set_midnight_and_last_minute() {
        let bytes = SlaveMessage::set(0, 0, 0).unwrap().encode().unwrap();
        assert_eq!(&bytes[..], b"S00000");

        let bytes = SlaveMessage::set(7, 23, 59).unwrap().encode().unwrap();
        assert_eq!(&bytes[..], b"S79532");
    }

    #[test]
    fn test_slot_out_of_range() {
        assert_eq!(SlaveMessage::set(8, 12, 0), Err(EncodeError::SlotOutOfRange(8)));
    }

    #[test]
    fn test_invalid_time() {
        assert_eq!(
            SlaveMessage::set(1, 24, 0),
            Err(EncodeError::InvalidTime { hour: 24, minute: 0 })
        );

        // Hand-built messages are checked again at encode time
        let msg = SlaveMessage::Set {
            slot: 1,
            time: WallTime { hour: 3, minute: 60 },
        };
        assert!(msg.encode().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(SlaveMessage::parse(b""), Err(DecodeError::InvalidLength(0)));
        assert_eq!(SlaveMessage::parse(b"XE"), Err(DecodeError::MissingPrefix));
        assert_eq!(SlaveMessage::parse(b"S1234"), Err(DecodeError::InvalidLength(5)));
        assert_eq!(SlaveMessage::parse(b"S2a070"), Err(DecodeError::InvalidDigit(b'a')));
        assert_eq!(SlaveMessage::parse(b"S90000"), Err(DecodeError::OutOfRange));
    }

    proptest! {
        #[test]
        fn prop_set_parses_back(slot in 0u8..8, hour in 0u8..24, minute in 0u8..60) {
            let msg = SlaveMessage::set(slot, hour, minute).unwrap();
            let bytes = msg.encode().unwrap();
            prop_assert_eq!(bytes.len(), MAX_MESSAGE_LEN);
            prop_assert_eq!(SlaveMessage::parse(&bytes), Ok(msg));
        }
    }
}
