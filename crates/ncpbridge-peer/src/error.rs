use ncpbridge_msg::ConfirmCategory;

/// Errors that can occur in bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] ncpbridge_transport::TransportError),

    /// Frame-level error, including an exhausted transmit pool.
    #[error("frame error: {0}")]
    Frame(#[from] ncpbridge_frame::FrameError),

    /// Message encoding or decoding error.
    #[error("message error: {0}")]
    Msg(#[from] ncpbridge_msg::MsgError),

    /// A request expecting a confirm was issued without a handler for it.
    #[error("no confirm handler supplied for {0} request")]
    MissingCallback(ConfirmCategory),
}

impl BridgeError {
    /// Whether the request failed only because every transmit slot is busy.
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(
            self,
            Self::Frame(ncpbridge_frame::FrameError::PoolExhausted { .. })
        )
    }

    /// Whether the far end closed the link, on either the read or the write
    /// path.
    pub fn is_link_closed(&self) -> bool {
        use ncpbridge_frame::FrameError;
        use ncpbridge_transport::TransportError;
        matches!(
            self,
            Self::Transport(TransportError::Closed)
                | Self::Frame(FrameError::Transport(TransportError::Closed))
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
