use ncpbridge_frame::{FrameConfig, DEFAULT_MAX_FRAME, DEFAULT_TX_SLOTS, PROTOCOL_ID_RF4CONTROL};
use serde::Serialize;

use crate::error::Result;

/// Sizing and identity of one bridge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeConfig {
    /// Protocol id stamped on outgoing frames and required on incoming ones.
    pub protocol_id: u8,
    /// Transmit ring depth.
    pub tx_slots: usize,
    /// Largest frame, sentinels included, either direction.
    pub max_frame_len: usize,
    /// Bytes requested from the link per read.
    pub rx_chunk_len: usize,
}

impl BridgeConfig {
    /// Framing subset shared by the reader and the transmit pool.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            protocol_id: self.protocol_id,
            max_frame_len: self.max_frame_len,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.frame_config().validate()?;
        if self.rx_chunk_len == 0 {
            return Err(ncpbridge_frame::FrameError::InvalidConfig(
                "rx_chunk_len must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            protocol_id: PROTOCOL_ID_RF4CONTROL,
            tx_slots: DEFAULT_TX_SLOTS,
            max_frame_len: DEFAULT_MAX_FRAME,
            rx_chunk_len: DEFAULT_MAX_FRAME,
        }
    }
}
