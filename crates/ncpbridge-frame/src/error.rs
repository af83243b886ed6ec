/// Errors that can occur while encoding, queueing or transmitting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Every transmit slot holds a frame that has not been fully sent yet.
    #[error("no free transmit slot ({slots} in use)")]
    PoolExhausted { slots: usize },

    /// The encoded frame does not fit the configured frame size or the
    /// one-byte length field.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The configuration cannot describe a usable frame.
    #[error("invalid frame configuration: {0}")]
    InvalidConfig(String),

    /// The link failed while transmitting.
    #[error("transport error: {0}")]
    Transport(#[from] ncpbridge_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
