use bytes::BytesMut;
use serde::Serialize;
use tracing::trace;

use crate::code::{MessageKind, MessageType};
use crate::confirm::Confirm;
use crate::error::Result;
use crate::indication::Indication;
use crate::request::Request;
use crate::wire::{Decoder, WireFormat};

/// A payload struct bound to exactly one message type.
pub trait Payload: WireFormat {
    const MESSAGE_TYPE: MessageType;

    /// Encode after the message-type byte.
    fn to_payload(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.put(&mut buf);
        buf.to_vec()
    }

    /// Decode what followed the message-type byte.
    fn from_payload(payload: &[u8]) -> Result<Self> {
        decode_payload(Self::MESSAGE_TYPE, payload)
    }
}

/// Decode one payload, ignoring trailing bytes.
pub fn decode_payload<T: WireFormat>(message_type: MessageType, payload: &[u8]) -> Result<T> {
    let mut src = Decoder::new(message_type.name(), payload);
    let value = T::take(&mut src)?;
    if src.remaining() > 0 {
        trace!(
            message = message_type.name(),
            extra = src.remaining(),
            "ignoring trailing payload bytes"
        );
    }
    Ok(value)
}

/// Declare a closed enum over payload structs, with per-variant dispatch.
macro_rules! message_family {
    (
        $(#[$meta:meta])*
        pub enum $family:ident ($expected:literal) {
            $( $variant:ident ( $payload:ident ) = $code:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
        #[serde(tag = "message", rename_all = "snake_case")]
        pub enum $family {
            $( $variant($payload), )*
        }

        impl $family {
            /// Message-type byte for this value.
            pub fn message_type(&self) -> $crate::code::MessageType {
                match self {
                    $( Self::$variant(_) => $crate::code::MessageType::$code, )*
                }
            }

            /// Reject values the wire format cannot carry.
            pub fn check(&self) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant(m) => $crate::wire::WireFormat::check(m), )*
                }
            }

            /// Append the payload that follows the message-type byte.
            pub fn encode_payload(&self, dst: &mut bytes::BytesMut) {
                match self {
                    $( Self::$variant(m) => $crate::wire::WireFormat::put(m, dst), )*
                }
            }

            /// Decode a payload of the given message type.
            pub fn decode(
                message_type: $crate::code::MessageType,
                payload: &[u8],
            ) -> $crate::error::Result<Self> {
                match message_type {
                    $(
                        $crate::code::MessageType::$code => {
                            $crate::message::decode_payload::<$payload>(message_type, payload)
                                .map(Self::$variant)
                        }
                    )*
                    #[allow(unreachable_patterns)]
                    other => Err($crate::error::MsgError::UnexpectedKind {
                        message: other.name(),
                        expected: $expected,
                    }),
                }
            }
        }

        $(
            impl From<$payload> for $family {
                fn from(value: $payload) -> Self {
                    Self::$variant(value)
                }
            }

            impl $crate::message::Payload for $payload {
                const MESSAGE_TYPE: $crate::code::MessageType = $crate::code::MessageType::$code;
            }
        )*
    };
}

pub(crate) use message_family;

/// Any bridge message, classified by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Message {
    /// Requests and responses, host to NCP.
    Request(Request),
    Confirm(Confirm),
    Indication(Indication),
}

impl Message {
    /// Decode a frame body given its raw message-type byte.
    pub fn decode(message_type: u8, payload: &[u8]) -> Result<Self> {
        let ty = MessageType::try_from(message_type)?;
        match ty.kind() {
            MessageKind::Request | MessageKind::Response => {
                Request::decode(ty, payload).map(Self::Request)
            }
            MessageKind::Confirm => Confirm::decode(ty, payload).map(Self::Confirm),
            MessageKind::Indication => Indication::decode(ty, payload).map(Self::Indication),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Request(m) => m.message_type(),
            Self::Confirm(m) => m.message_type(),
            Self::Indication(m) => m.message_type(),
        }
    }

    pub fn check(&self) -> Result<()> {
        match self {
            Self::Request(m) => m.check(),
            Self::Confirm(m) => m.check(),
            Self::Indication(m) => m.check(),
        }
    }

    pub fn encode_payload(&self, dst: &mut BytesMut) {
        match self {
            Self::Request(m) => m.encode_payload(dst),
            Self::Confirm(m) => m.encode_payload(dst),
            Self::Indication(m) => m.encode_payload(dst),
        }
    }
}

impl From<Request> for Message {
    fn from(value: Request) -> Self {
        Self::Request(value)
    }
}

impl From<Confirm> for Message {
    fn from(value: Confirm) -> Self {
        Self::Confirm(value)
    }
}

impl From<Indication> for Message {
    fn from(value: Indication) -> Self {
        Self::Indication(value)
    }
}
