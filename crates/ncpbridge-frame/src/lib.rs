//! Sentinel-delimited serial framing for the NCP bridge.
//!
//! Every frame on the wire looks like:
//! - a start sentinel (`0x01`)
//! - a 1-byte length counting everything up to the end sentinel
//! - a 1-byte protocol id, so foreign traffic on a shared line is ignored
//! - a 1-byte message type and its payload
//! - an end sentinel (`0x04`)
//!
//! [`FrameReader`] reassembles frames from arbitrarily chunked input and
//! [`TxPool`] holds encoded frames until a non-blocking link has taken all
//! of their bytes.

pub mod codec;
pub mod error;
pub mod pool;
pub mod reader;

pub use codec::{
    encode_frame, Frame, FrameConfig, DEFAULT_MAX_FRAME, END_OF_FRAME, FRAME_OVERHEAD,
    MAX_LENGTH_FIELD, PROTOCOL_ID_RF4CONTROL, START_OF_FRAME,
};
pub use error::{FrameError, Result};
pub use pool::{DrainStatus, TxPool, DEFAULT_TX_SLOTS};
pub use reader::{FrameReader, ReaderState, ReaderStats};
