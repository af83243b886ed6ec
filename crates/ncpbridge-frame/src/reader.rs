use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::codec::{Frame, FrameConfig, END_OF_FRAME, FRAME_OVERHEAD, START_OF_FRAME};

/// Position of the reader within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    AwaitStart,
    AwaitLength,
    AwaitProtocolId,
    AwaitPayload,
    AwaitEnd,
}

/// Counters describing what the reader has seen since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames handed out to the caller.
    pub frames: u64,
    /// Bytes skipped while hunting for a start sentinel.
    pub skipped_bytes: u64,
    /// Zero length fields ("no message").
    pub null_frames: u64,
    /// Length fields announcing a frame larger than the reassembly buffer.
    pub oversized: u64,
    /// Frames whose end sentinel was wrong.
    pub bad_end: u64,
    /// Well-formed frames tagged with another protocol id.
    pub foreign: u64,
    /// Well-formed frames without a message-type byte.
    pub empty: u64,
}

/// Byte-stream reassembly state machine.
///
/// Feed it bytes in whatever chunks the link delivers; it hands back at most
/// one frame per completed end sentinel. Malformed and foreign frames are
/// dropped and the reader returns to hunting for a start sentinel. Only one
/// frame is ever in progress.
#[derive(Debug)]
pub struct FrameReader {
    config: FrameConfig,
    state: ReaderState,
    protocol_id: u8,
    remaining: usize,
    buf: BytesMut,
    stats: ReaderStats,
}

impl FrameReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            state: ReaderState::AwaitStart,
            protocol_id: 0,
            remaining: 0,
            buf: BytesMut::with_capacity(config.max_frame_len),
            stats: ReaderStats::default(),
        }
    }

    /// Advance the state machine by one byte.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            ReaderState::AwaitStart => {
                if byte == START_OF_FRAME {
                    self.state = ReaderState::AwaitLength;
                } else {
                    self.stats.skipped_bytes += 1;
                }
                None
            }
            ReaderState::AwaitLength => {
                let length = usize::from(byte);
                if length == 0 {
                    trace!("null frame");
                    self.stats.null_frames += 1;
                    self.reset();
                } else if length + FRAME_OVERHEAD > self.config.max_frame_len {
                    debug!(length, max = self.config.max_frame_len, "length exceeds reassembly buffer");
                    self.stats.oversized += 1;
                    self.reset();
                } else {
                    self.remaining = length;
                    self.state = ReaderState::AwaitProtocolId;
                }
                None
            }
            ReaderState::AwaitProtocolId => {
                self.protocol_id = byte;
                self.remaining -= 1;
                self.buf.clear();
                self.state = if self.remaining == 0 {
                    ReaderState::AwaitEnd
                } else {
                    ReaderState::AwaitPayload
                };
                None
            }
            ReaderState::AwaitPayload => {
                self.buf.put_u8(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = ReaderState::AwaitEnd;
                }
                None
            }
            ReaderState::AwaitEnd => {
                let frame = self.finish(byte);
                self.reset();
                frame
            }
        }
    }

    /// Feed bytes until one frame completes or the input runs out.
    ///
    /// Returns how many bytes were consumed and the completed frame, if any.
    /// Unconsumed bytes belong to later frames and must be fed again.
    pub fn push(&mut self, bytes: &[u8]) -> (usize, Option<Frame>) {
        for (idx, &byte) in bytes.iter().enumerate() {
            if let Some(frame) = self.feed(byte) {
                return (idx + 1, Some(frame));
            }
        }
        (bytes.len(), None)
    }

    /// Abandon any partial frame and hunt for the next start sentinel.
    pub fn reset(&mut self) {
        self.state = ReaderState::AwaitStart;
        self.remaining = 0;
        self.buf.clear();
    }

    /// Current state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Whether a frame is partially assembled.
    pub fn in_frame(&self) -> bool {
        self.state != ReaderState::AwaitStart
    }

    /// Counters since creation.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn finish(&mut self, byte: u8) -> Option<Frame> {
        if byte != END_OF_FRAME {
            debug!(byte, "missing end sentinel; dropping frame");
            self.stats.bad_end += 1;
            return None;
        }
        if self.protocol_id != self.config.protocol_id {
            trace!(protocol_id = self.protocol_id, "ignoring foreign frame");
            self.stats.foreign += 1;
            return None;
        }
        if self.buf.is_empty() {
            debug!("frame without message type; dropping");
            self.stats.empty += 1;
            return None;
        }

        let mut body = self.buf.split().freeze();
        let message_type = body[0];
        let payload = body.split_off(1);
        self.stats.frames += 1;
        trace!(message_type, len = payload.len(), "frame assembled");
        Some(Frame {
            protocol_id: self.protocol_id,
            message_type,
            payload,
        })
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_frame, DEFAULT_MAX_FRAME, PROTOCOL_ID_RF4CONTROL};

    fn wire(message_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(
            PROTOCOL_ID_RF4CONTROL,
            message_type,
            payload,
            DEFAULT_MAX_FRAME,
            &mut buf,
        )
        .unwrap();
        buf.to_vec()
    }

    fn collect(reader: &mut FrameReader, mut bytes: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        while !bytes.is_empty() {
            let (used, frame) = reader.push(bytes);
            frames.extend(frame);
            bytes = &bytes[used..];
        }
        frames
    }

    #[test]
    fn reads_single_frame() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, &wire(0x07, &[0x01]));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, 0x07);
        assert_eq!(frames[0].payload.as_ref(), &[0x01]);
        assert_eq!(reader.state(), ReaderState::AwaitStart);
    }

    #[test]
    fn state_progression() {
        let mut reader = FrameReader::new();
        let bytes = wire(0x07, &[0x01]);
        let expected = [
            ReaderState::AwaitLength,
            ReaderState::AwaitProtocolId,
            ReaderState::AwaitPayload,
            ReaderState::AwaitPayload,
            ReaderState::AwaitEnd,
        ];
        for (byte, state) in bytes.iter().zip(expected) {
            assert!(reader.feed(*byte).is_none());
            assert_eq!(reader.state(), state);
        }
        assert!(reader.feed(bytes[5]).is_some());
        assert_eq!(reader.state(), ReaderState::AwaitStart);
    }

    #[test]
    fn push_stops_after_first_frame() {
        let mut stream = wire(0x0A, &[]);
        stream.extend(wire(0x18, &[0x00]));

        let mut reader = FrameReader::new();
        let (used, frame) = reader.push(&stream);
        assert_eq!(used, 5);
        assert_eq!(frame.unwrap().message_type, 0x0A);

        let (used, frame) = reader.push(&stream[5..]);
        assert_eq!(used, 6);
        assert_eq!(frame.unwrap().message_type, 0x18);
    }

    #[test]
    fn every_split_point_yields_same_frame() {
        let bytes = wire(0x00, &[0x01, 0x01, 0x34, 0x12, 0x09, 0x03, 0xAA, 0xBB, 0xCC]);
        let mut whole = FrameReader::new();
        let expected = collect(&mut whole, &bytes);
        assert_eq!(expected.len(), 1);

        for split in 0..=bytes.len() {
            let mut reader = FrameReader::new();
            let mut frames = collect(&mut reader, &bytes[..split]);
            frames.extend(collect(&mut reader, &bytes[split..]));
            assert_eq!(frames, expected, "split at {split}");
        }
    }

    #[test]
    fn one_byte_at_a_time() {
        let bytes = wire(0x13, &[0x55; 40]);
        let mut reader = FrameReader::new();
        let mut frames = Vec::new();
        for byte in &bytes {
            frames.extend(reader.feed(*byte));
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.len(), 40);
    }

    #[test]
    fn garbage_prefix_is_skipped() {
        let mut stream = vec![0xFF, 0x00, 0x42, 0x04, 0x99];
        stream.extend(wire(0x18, &[0x00]));

        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, 0x18);
        assert_eq!(reader.stats().skipped_bytes, 5);
    }

    #[test]
    fn zero_length_is_a_null_message() {
        let mut stream = vec![START_OF_FRAME, 0x00];
        stream.extend(wire(0x18, &[0x00]));

        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(reader.stats().null_frames, 1);
    }

    #[test]
    fn bad_end_sentinel_drops_frame_and_resyncs() {
        let mut bad = wire(0x18, &[0x00]);
        let last = bad.len() - 1;
        bad[last] = 0x05;
        bad.extend(wire(0x1B, &[0x00]));

        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, &bad);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, 0x1B);
        assert_eq!(reader.stats().bad_end, 1);
    }

    #[test]
    fn foreign_protocol_is_consumed_silently() {
        let mut foreign = BytesMut::new();
        encode_frame(0x7E, 0x18, &[0x00], DEFAULT_MAX_FRAME, &mut foreign).unwrap();
        let mut stream = foreign.to_vec();
        stream.extend(wire(0x18, &[0x01]));

        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), &[0x01]);
        assert_eq!(reader.stats().foreign, 1);
    }

    #[test]
    fn oversized_length_resets() {
        let cfg = FrameConfig {
            max_frame_len: 16,
            ..FrameConfig::default()
        };
        let mut stream = vec![START_OF_FRAME, 0x20];
        stream.extend(wire(0x18, &[0x00]));

        let mut reader = FrameReader::with_config(cfg);
        let frames = collect(&mut reader, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(reader.stats().oversized, 1);
    }

    #[test]
    fn length_one_frame_has_no_message_type() {
        let stream = [START_OF_FRAME, 0x01, PROTOCOL_ID_RF4CONTROL, END_OF_FRAME];
        let mut reader = FrameReader::new();
        assert!(collect(&mut reader, &stream).is_empty());
        assert_eq!(reader.stats().empty, 1);
        assert_eq!(reader.state(), ReaderState::AwaitStart);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let bytes = wire(0x18, &[0x00]);
        let mut reader = FrameReader::new();
        reader.push(&bytes[..3]);
        assert!(reader.in_frame());

        reader.reset();
        assert!(!reader.in_frame());
        let frames = collect(&mut reader, &bytes);
        assert_eq!(frames.len(), 1);
    }
}
