use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{MsgError, Result};
use crate::wire::{Decoder, WireFormat};

/// Entries in a device-type list.
pub const DEVICE_TYPE_LIST_LEN: usize = 3;
/// Entries in a profile-id list.
pub const PROFILE_ID_LIST_LEN: usize = 7;
/// Bytes in a ZRC supported-command bitmap.
pub const COMMAND_BITMAP_LEN: usize = 32;
/// Bytes in a security link key.
pub const LINK_KEY_LEN: usize = 16;
/// Bytes in a vendor string.
pub const VENDOR_STRING_LEN: usize = 7;
/// Bytes in a user string.
pub const USER_STRING_LEN: usize = 15;

macro_rules! byte_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u8);

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl WireFormat for $name {
            fn put(&self, dst: &mut BytesMut) {
                dst.put_u8(self.0);
            }

            fn take(src: &mut Decoder<'_>) -> Result<Self> {
                src.u8().map(Self)
            }
        }
    };
}

byte_newtype!(
    /// Network-layer status code. Unknown values are carried through unchanged.
    NwkStatus
);

impl NwkStatus {
    pub const SUCCESS: Self = Self(0x00);
    pub const NO_ORG_CAPACITY: Self = Self(0xB0);
    pub const NO_REC_CAPACITY: Self = Self(0xB1);
    pub const NO_PAIRING: Self = Self(0xB2);
    pub const NO_RESPONSE: Self = Self(0xB3);
    pub const NOT_PERMITTED: Self = Self(0xB4);
    pub const DUPLICATE_PAIRING: Self = Self(0xB5);
    pub const FRAME_COUNTER_EXPIRED: Self = Self(0xB6);
    pub const DISCOVERY_ERROR: Self = Self(0xB7);
    pub const DISCOVERY_TIMEOUT: Self = Self(0xB8);
    pub const SECURITY_TIMEOUT: Self = Self(0xB9);
    pub const SECURITY_FAILURE: Self = Self(0xBA);
    pub const MAC_CHANNEL_ACCESS_FAILURE: Self = Self(0xE1);
    pub const MAC_DISABLE_TRX_FAILURE: Self = Self(0xE3);
    pub const MAC_FRAME_TOO_LONG: Self = Self(0xE5);
    pub const MAC_INVALID_GTS: Self = Self(0xE6);
    pub const MAC_INVALID_HANDLE: Self = Self(0xE7);
    pub const INVALID_PARAMETER: Self = Self(0xE8);
    pub const MAC_NO_ACK: Self = Self(0xE9);
    pub const MAC_NO_BEACON: Self = Self(0xEA);
    pub const MAC_NO_DATA: Self = Self(0xEB);
    pub const MAC_NO_SHORT_ADDRESS: Self = Self(0xEC);
    pub const MAC_OUT_OF_CAP: Self = Self(0xED);
    pub const MAC_PAN_ID_CONFLICT: Self = Self(0xEE);
    pub const MAC_REALIGNMENT: Self = Self(0xEF);
    pub const MAC_TRANSACTION_EXPIRED: Self = Self(0xF0);
    pub const MAC_TRANSACTION_OVERFLOW: Self = Self(0xF1);
    pub const MAC_TX_ACTIVE: Self = Self(0xF2);
    pub const UNSUPPORTED_ATTRIBUTE: Self = Self(0xF4);
    pub const MAC_INVALID_ADDRESS: Self = Self(0xF5);
    pub const INVALID_INDEX: Self = Self(0xF9);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Symbolic name, if the code is a known one.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0x00 => "SUCCESS",
            0xB0 => "NO_ORG_CAPACITY",
            0xB1 => "NO_REC_CAPACITY",
            0xB2 => "NO_PAIRING",
            0xB3 => "NO_RESPONSE",
            0xB4 => "NOT_PERMITTED",
            0xB5 => "DUPLICATE_PAIRING",
            0xB6 => "FRAME_COUNTER_EXPIRED",
            0xB7 => "DISCOVERY_ERROR",
            0xB8 => "DISCOVERY_TIMEOUT",
            0xB9 => "SECURITY_TIMEOUT",
            0xBA => "SECURITY_FAILURE",
            0xE1 => "MAC_CHANNEL_ACCESS_FAILURE",
            0xE3 => "MAC_DISABLE_TRX_FAILURE",
            0xE5 => "MAC_FRAME_TOO_LONG",
            0xE6 => "MAC_INVALID_GTS",
            0xE7 => "MAC_INVALID_HANDLE",
            0xE8 => "INVALID_PARAMETER",
            0xE9 => "MAC_NO_ACK",
            0xEA => "MAC_NO_BEACON",
            0xEB => "MAC_NO_DATA",
            0xEC => "MAC_NO_SHORT_ADDRESS",
            0xED => "MAC_OUT_OF_CAP",
            0xEE => "MAC_PAN_ID_CONFLICT",
            0xEF => "MAC_REALIGNMENT",
            0xF0 => "MAC_TRANSACTION_EXPIRED",
            0xF1 => "MAC_TRANSACTION_OVERFLOW",
            0xF2 => "MAC_TX_ACTIVE",
            0xF4 => "UNSUPPORTED_ATTRIBUTE",
            0xF5 => "MAC_INVALID_ADDRESS",
            0xF9 => "INVALID_INDEX",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for NwkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}", self.0),
        }
    }
}

byte_newtype!(
    /// RF4CE device type.
    DevType
);

impl DevType {
    pub const RESERVED: Self = Self(0x00);
    pub const REMOTE_CONTROL: Self = Self(0x01);
    pub const TELEVISION: Self = Self(0x02);
    pub const PROJECTOR: Self = Self(0x03);
    pub const PLAYER: Self = Self(0x04);
    pub const RECORDER: Self = Self(0x05);
    pub const VIDEO: Self = Self(0x06);
    pub const AUDIO: Self = Self(0x07);
    pub const AV_RECORDER: Self = Self(0x08);
    pub const SET_TOP_BOX: Self = Self(0x09);
    pub const HOME_THEATER: Self = Self(0x0A);
    pub const MEDIA_CENTER: Self = Self(0x0B);
    pub const GAME_CONSOLE: Self = Self(0x0C);
    pub const SAT_RADIO: Self = Self(0x0D);
    pub const IR_EXTENDER: Self = Self(0x0E);
    pub const MONITOR: Self = Self(0x0F);
    pub const GENERIC: Self = Self(0xFE);
    pub const WILDCARD: Self = Self(0xFF);
}

byte_newtype!(
    /// RF4CE profile identifier.
    ProfileId
);

impl ProfileId {
    pub const RESERVED: Self = Self(0x00);
    /// Consumer electronics remote control.
    pub const ZRC: Self = Self(0x01);
    /// Input device.
    pub const ZID: Self = Self(0x02);
    pub const VENDOR_DATA: Self = Self(0xFE);
    pub const WILDCARD: Self = Self(0xFF);
}

byte_newtype!(
    /// Channel-agility operating mode.
    AgilityMode
);

impl AgilityMode {
    pub const ONE_SHOT: Self = Self(0x00);
    pub const PERIODIC: Self = Self(0x01);
    pub const STOP: Self = Self(0x02);
}

byte_newtype!(
    /// Destination addressing mode in a comm-status indication.
    AddrMode
);

impl AddrMode {
    pub const SHORT: Self = Self(0x00);
    pub const IEEE: Self = Self(0x01);
}

/// Transmit option bits for data, vendor-data and ZRC command requests.
pub mod tx_options {
    pub const UNICAST: u8 = 0x00;
    pub const BROADCAST: u8 = 0x01;
    pub const DST_ADDR_NET: u8 = 0x00;
    pub const DST_ADDR_IEEE: u8 = 0x02;
    pub const ACK_REQ: u8 = 0x04;
    pub const SEC_REQ: u8 = 0x08;
    pub const SINGLE_CHANNEL: u8 = 0x10;
    pub const CHANNEL_SPECIFIED: u8 = 0x20;
    pub const VENDOR_SPECIFIC: u8 = 0x40;
}

/// Receive flag bits on data, vendor-data and ZRC command indications.
pub mod rx_flags {
    pub const UNICAST: u8 = 0x00;
    pub const BROADCAST: u8 = 0x01;
    pub const WITH_SECURITY: u8 = 0x02;
    pub const VENDOR_SPECIFIC: u8 = 0x04;
}

/// Fixed-width, NUL-padded string field (vendor and user strings).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedString<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedString<N> {
    /// Build from text, truncating to `N` bytes and padding with NUL.
    pub fn new(text: &str) -> Self {
        let mut raw = [0u8; N];
        let src = text.as_bytes();
        let len = src.len().min(N);
        raw[..len].copy_from_slice(&src[..len]);
        Self(raw)
    }

    /// Text up to the first NUL, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(N);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> Serialize for FixedString<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<const N: usize> WireFormat for FixedString<N> {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.0);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(src.bytes(N)?);
        Ok(Self(raw))
    }
}

pub type VendorString = FixedString<VENDOR_STRING_LEN>;
pub type UserString = FixedString<USER_STRING_LEN>;
pub type DevTypeList = [DevType; DEVICE_TYPE_LIST_LEN];
pub type ProfileIdList = [ProfileId; PROFILE_ID_LIST_LEN];

/// Device-type list with the first entry set and the rest reserved.
pub fn dev_type_list(first: DevType) -> DevTypeList {
    let mut list = DevTypeList::default();
    list[0] = first;
    list
}

/// Profile-id list with the first entry set and the rest reserved.
pub fn profile_id_list(first: ProfileId) -> ProfileIdList {
    let mut list = ProfileIdList::default();
    list[0] = first;
    list
}

/// Bytes of one node descriptor on the wire.
pub const NODE_DESC_LEN: usize = 49;
/// Node descriptors a discovery confirm can carry.
pub const MAX_NODE_DESCRIPTORS: usize = 3;

crate::wire::wire_struct! {
    /// Description of one node answering a discovery.
    pub struct NodeDesc {
        pub status: NwkStatus,
        pub logical_channel: u8,
        pub pan_id: u16,
        pub ieee_addr: u64,
        pub node_capabilities: u8,
        pub vendor_id: u16,
        pub vendor_string: VendorString,
        pub app_capabilities: u8,
        pub user_string: UserString,
        pub dev_types: DevTypeList,
        pub profiles: ProfileIdList,
        pub disc_req_lqi: u8,
    }
}

/// Node descriptors reported by a discovery confirm.
///
/// Encoded as a count, the total descriptor byte size, then the descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct NodeList(pub Vec<NodeDesc>);

impl WireFormat for NodeList {
    fn put(&self, dst: &mut BytesMut) {
        let nodes = &self.0[..self.0.len().min(MAX_NODE_DESCRIPTORS)];
        dst.put_u8(nodes.len() as u8);
        dst.put_u8((nodes.len() * NODE_DESC_LEN) as u8);
        for node in nodes {
            node.put(dst);
        }
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        let count = usize::from(src.u8()?);
        if count > MAX_NODE_DESCRIPTORS {
            return Err(MsgError::TooManyNodes {
                count,
                max: MAX_NODE_DESCRIPTORS,
            });
        }
        let size = usize::from(src.u8()?);
        if size != count * NODE_DESC_LEN {
            debug!(count, size, "node list byte size disagrees with its count; using count");
        }
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            nodes.push(NodeDesc::take(src)?);
        }
        Ok(Self(nodes))
    }

    fn check(&self) -> Result<()> {
        if self.0.len() > MAX_NODE_DESCRIPTORS {
            return Err(MsgError::TooManyNodes {
                count: self.0.len(),
                max: MAX_NODE_DESCRIPTORS,
            });
        }
        self.0.iter().try_for_each(|node| node.check())
    }
}
