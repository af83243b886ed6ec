//! Serial network-control-protocol bridge for RF4CE co-processors.
//!
//! An application on one processor drives an RF4CE network stack running on
//! another over a plain byte stream. This crate bundles the layers:
//!
//! - [`transport`]: non-blocking byte links (in-memory, stream, Unix socket)
//! - [`frame`]: sentinel framing, stream reassembly and the transmit ring
//! - [`msg`]: message types and their field-by-field payload codec
//! - [`peer`]: host and NCP roles with their polling tasks (behind `peer`)
//! - [`stack`]: an emulated network stack for exercising the NCP role
//!   without a radio (behind `peer`)

/// Re-export transport types.
pub mod transport {
    pub use ncpbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ncpbridge_frame::*;
}

/// Re-export message types.
pub mod msg {
    pub use ncpbridge_msg::*;
}

/// Re-export host and NCP roles (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use ncpbridge_peer::*;
}

#[cfg(feature = "peer")]
pub mod stack;
