//! RF4CE network-layer messages carried by the NCP bridge.
//!
//! Each frame body starts with a message-type byte ([`MessageType`]) and
//! continues with a fixed, field-by-field payload. Payloads are plain
//! structs grouped into three closed enums by direction and role:
//! - [`Request`]: host to NCP, including responses to indications
//! - [`Confirm`]: NCP to host, completing one request
//! - [`Indication`]: NCP to host, unsolicited
//!
//! Multi-byte integers are little-endian, list fields have a fixed number of
//! entries, and variable-length fields carry a one-byte length prefix.

pub mod code;
pub mod confirm;
pub mod error;
pub mod indication;
pub mod message;
pub mod nib;
pub mod request;
pub mod types;
pub mod wire;

pub use code::{ConfirmCategory, MessageKind, MessageType};
pub use confirm::Confirm;
pub use error::{MsgError, Result};
pub use indication::Indication;
pub use message::{decode_payload, Message, Payload};
pub use nib::NibAttribute;
pub use request::Request;
pub use types::{
    AddrMode, AgilityMode, DevType, FixedString, NodeDesc, NodeList, NwkStatus, ProfileId,
    UserString, VendorString,
};
pub use wire::WireFormat;
