use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-frame sentinel.
pub const START_OF_FRAME: u8 = 0x01;

/// End-of-frame sentinel.
pub const END_OF_FRAME: u8 = 0x04;

/// Protocol id carried by RF4CE control frames.
pub const PROTOCOL_ID_RF4CONTROL: u8 = 0x01;

/// Bytes on the wire that the length field does not count: start sentinel,
/// the length byte itself and the end sentinel.
pub const FRAME_OVERHEAD: usize = 3;

/// Largest value the one-byte length field can carry.
pub const MAX_LENGTH_FIELD: usize = u8::MAX as usize;

/// Default size of the reassembly buffer and of each transmit slot, sentinels
/// included.
pub const DEFAULT_MAX_FRAME: usize = 200;

/// Smallest frame that carries a message: sentinels, length, protocol id and
/// message type.
const MIN_FRAME: usize = FRAME_OVERHEAD + 2;

/// One reassembled bridge frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol id the frame was tagged with.
    pub protocol_id: u8,
    /// Message type selecting the payload layout.
    pub message_type: u8,
    /// Message-type-specific payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame.
    pub fn new(protocol_id: u8, message_type: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            protocol_id,
            message_type,
            payload: payload.into(),
        }
    }

    /// The value of the length field for this frame.
    pub fn length_field(&self) -> usize {
        2 + self.payload.len()
    }

    /// Total bytes this frame occupies on the wire.
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.length_field()
    }
}

/// Encode one frame into `dst`.
///
/// Wire format:
/// ```text
/// ┌──────┬────────┬──────────┬──────────┬──────────────┬──────┐
/// │ SOF  │ Length │ Protocol │ Msg type │ Payload      │ EOF  │
/// │ 0x01 │ (1B)   │ (1B)     │ (1B)     │ (Length - 2) │ 0x04 │
/// └──────┴────────┴──────────┴──────────┴──────────────┴──────┘
/// ```
///
/// `Length` counts protocol id, message type and payload. Payload bytes are
/// not escaped.
pub fn encode_frame(
    protocol_id: u8,
    message_type: u8,
    payload: &[u8],
    max_frame_len: usize,
    dst: &mut BytesMut,
) -> Result<()> {
    let length = 2 + payload.len();
    let total = FRAME_OVERHEAD + length;
    let max = max_frame_len.min(FRAME_OVERHEAD + MAX_LENGTH_FIELD);
    if total > max {
        return Err(FrameError::FrameTooLarge { size: total, max });
    }

    dst.reserve(total);
    dst.put_u8(START_OF_FRAME);
    dst.put_u8(length as u8);
    dst.put_u8(protocol_id);
    dst.put_u8(message_type);
    dst.put_slice(payload);
    dst.put_u8(END_OF_FRAME);
    Ok(())
}

/// Configuration shared by the reader and the transmit pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Protocol id accepted on receive and stamped on transmit. Default: 0x01.
    pub protocol_id: u8,
    /// Largest frame, sentinels included, that fits the reassembly buffer or
    /// a transmit slot. Default: 200 bytes.
    pub max_frame_len: usize,
}

impl FrameConfig {
    /// Reject configurations that cannot carry a message or cannot be
    /// expressed by the one-byte length field.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len < MIN_FRAME {
            return Err(FrameError::InvalidConfig(format!(
                "max_frame_len {} is below the {MIN_FRAME}-byte minimum frame",
                self.max_frame_len
            )));
        }
        if self.max_frame_len > FRAME_OVERHEAD + MAX_LENGTH_FIELD {
            return Err(FrameError::InvalidConfig(format!(
                "max_frame_len {} exceeds what a one-byte length field can describe",
                self.max_frame_len
            )));
        }
        Ok(())
    }

    /// Largest payload (after the message-type byte) a frame may carry.
    pub fn max_payload_len(&self) -> usize {
        self.max_frame_len.saturating_sub(MIN_FRAME)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            protocol_id: PROTOCOL_ID_RF4CONTROL,
            max_frame_len: DEFAULT_MAX_FRAME,
        }
    }
}
