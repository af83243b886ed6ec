use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::SerialLink;

/// Delivery characteristics of a [`MemoryLink`] endpoint.
///
/// Limits apply per call: a read hands out at most `max_read` bytes, a write
/// accepts at most `max_write` bytes and never more than the free space in the
/// far end's inbound queue (`capacity`). `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkProfile {
    pub max_read: Option<usize>,
    pub max_write: Option<usize>,
    pub capacity: Option<usize>,
}

impl LinkProfile {
    /// Deliver everything at once.
    pub const fn unlimited() -> Self {
        Self {
            max_read: None,
            max_write: None,
            capacity: None,
        }
    }

    /// Split every read and write into chunks of at most the given sizes.
    pub const fn chunked(max_read: usize, max_write: usize) -> Self {
        Self {
            max_read: Some(max_read),
            max_write: Some(max_write),
            capacity: None,
        }
    }

    /// Bound the number of bytes that may sit unread in the inbound queue.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl Default for LinkProfile {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[derive(Debug, Default)]
struct Pipe {
    bytes: VecDeque<u8>,
    closed: bool,
}

type SharedPipe = Arc<Mutex<Pipe>>;

/// One end of an in-process duplex byte link.
///
/// Created in pairs by [`MemoryLink::pair`]. Bytes written on one end become
/// readable on the other, in order and without loss, subject to the chunking
/// rules of each end's [`LinkProfile`].
#[derive(Debug)]
pub struct MemoryLink {
    inbound: SharedPipe,
    outbound: SharedPipe,
    profile: LinkProfile,
}

impl MemoryLink {
    /// Create two connected endpoints sharing one profile.
    pub fn pair(profile: LinkProfile) -> (Self, Self) {
        Self::pair_with(profile, profile)
    }

    /// Create two connected endpoints with independent profiles.
    pub fn pair_with(left: LinkProfile, right: LinkProfile) -> (Self, Self) {
        let a_to_b = SharedPipe::default();
        let b_to_a = SharedPipe::default();
        (
            Self {
                inbound: Arc::clone(&b_to_a),
                outbound: Arc::clone(&a_to_b),
                profile: left,
            },
            Self {
                inbound: a_to_b,
                outbound: b_to_a,
                profile: right,
            },
        )
    }

    /// Replace this endpoint's profile.
    pub fn set_profile(&mut self, profile: LinkProfile) {
        self.profile = profile;
    }

    /// Current profile of this endpoint.
    pub fn profile(&self) -> LinkProfile {
        self.profile
    }

    /// Number of bytes waiting to be read on this endpoint.
    pub fn pending(&self) -> usize {
        lock(&self.inbound).bytes.len()
    }

    /// Append raw bytes to this endpoint's inbound queue, bypassing the far end.
    ///
    /// Useful for injecting line noise or hand-built frames.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.inbound).bytes.extend(bytes.iter().copied());
    }

    /// Close the outbound direction. The far end reads what is queued, then
    /// sees [`TransportError::Closed`].
    pub fn close(&self) {
        lock(&self.outbound).closed = true;
    }
}

impl SerialLink for MemoryLink {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut pipe = lock(&self.inbound);
        if pipe.bytes.is_empty() {
            return if pipe.closed {
                Err(TransportError::Closed)
            } else {
                Ok(0)
            };
        }

        let limit = self.profile.max_read.unwrap_or(usize::MAX);
        let n = buf.len().min(limit).min(pipe.bytes.len());
        for (slot, byte) in buf.iter_mut().zip(pipe.bytes.drain(..n)) {
            *slot = byte;
        }
        trace!(bytes = n, "memory link read");
        Ok(n)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        let mut pipe = lock(&self.outbound);
        if pipe.closed {
            return Err(TransportError::Closed);
        }

        let room = self
            .profile
            .capacity
            .map(|cap| cap.saturating_sub(pipe.bytes.len()))
            .unwrap_or(usize::MAX);
        let limit = self.profile.max_write.unwrap_or(usize::MAX);
        let n = buf.len().min(limit).min(room);
        pipe.bytes.extend(buf[..n].iter().copied());
        trace!(offered = buf.len(), accepted = n, "memory link write");
        Ok(n)
    }
}

fn lock(pipe: &SharedPipe) -> MutexGuard<'_, Pipe> {
    pipe.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
