/// Errors raised while encoding or decoding message payloads.
#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    /// The message-type byte is not part of the bridge protocol.
    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),

    /// A message type was decoded as the wrong family.
    #[error("{message} is not a {expected}")]
    UnexpectedKind {
        message: &'static str,
        expected: &'static str,
    },

    /// The payload ended before every field was read.
    #[error("{message} truncated: needed {needed} more bytes, {remaining} left")]
    Truncated {
        message: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A discovery confirm carried more node descriptors than fit the list.
    #[error("{count} node descriptors exceed the maximum of {max}")]
    TooManyNodes { count: usize, max: usize },

    /// A NIB value does not match the attribute's fixed width.
    #[error("attribute 0x{attribute:02x} takes {expected} bytes, got {actual}")]
    AttributeSize {
        attribute: u8,
        expected: usize,
        actual: usize,
    },

    /// A length-prefixed field does not fit its one-byte length.
    #[error("field of {len} bytes exceeds the {max}-byte limit")]
    FieldTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, MsgError>;
