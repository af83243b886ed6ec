//! Non-blocking byte-stream links for the NCP serial bridge.
//!
//! The bridge only needs two operations from whatever carries its bytes:
//! "read what is available right now" and "write as much as you can accept
//! right now". Both may legitimately transfer zero bytes. [`SerialLink`]
//! captures that pair; this crate provides:
//! - [`MemoryLink`], an in-process duplex with configurable chunking
//! - [`StreamLink`], an adapter for any non-blocking `Read + Write` stream
//! - [`UnixDomainSocket`] (Unix only), a listener/connector producing
//!   non-blocking stream links
//!
//! This is the lowest layer of ncpbridge. Everything else builds on top of
//! the [`SerialLink`] trait provided here.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use memory::{LinkProfile, MemoryLink};
pub use traits::{SerialLink, StreamLink};

#[cfg(unix)]
pub use uds::UnixDomainSocket;
