//! Network information base attribute identifiers and their value widths.

use bytes::{BufMut, BytesMut};
use serde::Serialize;

use crate::error::{MsgError, Result};
use crate::wire::{Decoder, WireFormat};

/// Packed size of one pairing-table entry: source address, channel, IEEE
/// address, PAN id, network address, capabilities, frame counter, link key.
pub const PAIRING_TABLE_ENTRY_LEN: usize = 2 + 1 + 8 + 2 + 2 + 1 + 4 + 16;

/// NIB attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NibAttribute(pub u8);

impl NibAttribute {
    pub const ACTIVE_PERIOD: Self = Self(0x60);
    pub const BASE_CHANNEL: Self = Self(0x61);
    pub const DISCOVERY_LQI_THRESHOLD: Self = Self(0x62);
    pub const DISCOVERY_REPETITION_INTERVAL: Self = Self(0x63);
    pub const DUTY_CYCLE: Self = Self(0x64);
    pub const FRAME_COUNTER: Self = Self(0x65);
    pub const INDICATE_DISCOVERY_REQUESTS: Self = Self(0x66);
    pub const IN_POWER_SAVE: Self = Self(0x67);
    pub const PAIRING_TABLE: Self = Self(0x68);
    pub const MAX_DISCOVERY_REPETITIONS: Self = Self(0x69);
    pub const MAX_FIRST_ATTEMPT_CSMA_BACKOFFS: Self = Self(0x6A);
    pub const MAX_FIRST_ATTEMPT_FRAME_RETRIES: Self = Self(0x6B);
    pub const MAX_REPORTED_NODE_DESCRIPTORS: Self = Self(0x6C);
    pub const RESPONSE_WAIT_TIME: Self = Self(0x6D);
    pub const SCAN_DURATION: Self = Self(0x6E);
    pub const USER_STRING: Self = Self(0x6F);
    pub const PRIVATE_IEEE_ADDR: Self = Self(0x70);
    pub const PRIVATE_VENDOR_IDENTIFIER: Self = Self(0x71);
    pub const PRIVATE_VENDOR_STRING: Self = Self(0x72);
    pub const PRIVATE_NODE_CAPABILITIES: Self = Self(0x73);
    pub const PRIVATE_PAN_IDENTIFIER: Self = Self(0x74);
    pub const PRIVATE_SHORT_ADDRESS: Self = Self(0x75);
    pub const PRIVATE_MAX_PAIRING_TABLE_ENTRIES: Self = Self(0x76);
    pub const PRIVATE_CH_AG_ENABLED: Self = Self(0x77);
    pub const PRIVATE_CH_AG_SCAN_INTERVAL: Self = Self(0x78);
    pub const PRIVATE_CH_AG_ED_THRESHOLD: Self = Self(0x79);
    pub const KEY_REPEAT_INTERVAL: Self = Self(0x80);
    pub const KEY_REPEAT_WAIT_TIME: Self = Self(0x81);
    pub const KEY_EXCHANGE_TRANSFER_COUNT: Self = Self(0x82);

    /// Width in bytes of this attribute's value, if the attribute is known.
    pub fn value_size(self) -> Option<usize> {
        let size = match self.0 {
            0x60 | 0x63 | 0x64 | 0x65 | 0x6D | 0x78 => 4,
            0x61 | 0x62 | 0x69..=0x6C | 0x6E | 0x73 | 0x76 | 0x79 => 1,
            0x66 | 0x67 | 0x77 => 1,
            0x68 => PAIRING_TABLE_ENTRY_LEN,
            0x6F => 15,
            0x70 => 8,
            0x71 | 0x74 | 0x75 => 2,
            0x72 => 7,
            0x80..=0x82 => 1,
            _ => return None,
        };
        Some(size)
    }

    /// Check that `value` has this attribute's width. Unknown attributes
    /// accept any width.
    pub fn check_value(self, value: &[u8]) -> Result<()> {
        match self.value_size() {
            Some(expected) if expected != value.len() => Err(MsgError::AttributeSize {
                attribute: self.0,
                expected,
                actual: value.len(),
            }),
            _ => Ok(()),
        }
    }
}

impl From<u8> for NibAttribute {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl WireFormat for NibAttribute {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u8(self.0);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        src.u8().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sizes() {
        assert_eq!(NibAttribute::ACTIVE_PERIOD.value_size(), Some(4));
        assert_eq!(NibAttribute::BASE_CHANNEL.value_size(), Some(1));
        assert_eq!(NibAttribute::IN_POWER_SAVE.value_size(), Some(1));
        assert_eq!(NibAttribute::PAIRING_TABLE.value_size(), Some(36));
        assert_eq!(NibAttribute::USER_STRING.value_size(), Some(15));
        assert_eq!(NibAttribute::PRIVATE_IEEE_ADDR.value_size(), Some(8));
        assert_eq!(NibAttribute::PRIVATE_PAN_IDENTIFIER.value_size(), Some(2));
        assert_eq!(NibAttribute::PRIVATE_VENDOR_STRING.value_size(), Some(7));
        assert_eq!(NibAttribute::KEY_EXCHANGE_TRANSFER_COUNT.value_size(), Some(1));
    }

    #[test]
    fn unknown_attribute_has_no_size() {
        assert_eq!(NibAttribute(0x7A).value_size(), None);
        assert_eq!(NibAttribute(0x5F).value_size(), None);
        assert!(NibAttribute(0x7A).check_value(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn check_value_rejects_wrong_width() {
        let err = NibAttribute::ACTIVE_PERIOD.check_value(&[0x01]).unwrap_err();
        assert!(matches!(
            err,
            MsgError::AttributeSize {
                attribute: 0x60,
                expected: 4,
                actual: 1
            }
        ));
        assert!(NibAttribute::ACTIVE_PERIOD.check_value(&[0; 4]).is_ok());
    }
}
