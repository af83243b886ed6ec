use bytes::{BufMut, BytesMut};
use ncpbridge_transport::SerialLink;
use tracing::{debug, trace};

use crate::codec::{FrameConfig, END_OF_FRAME, FRAME_OVERHEAD, MAX_LENGTH_FIELD, START_OF_FRAME};
use crate::error::{FrameError, Result};

/// Default number of transmit slots.
pub const DEFAULT_TX_SLOTS: usize = 2;

/// Outcome of one [`TxPool::drain`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// Nothing queued.
    Idle,
    /// The oldest frame is still partly unsent.
    Partial { sent: usize, total: usize },
    /// The oldest frame went out completely and its slot was freed.
    Completed,
}

#[derive(Debug)]
struct Slot {
    buf: BytesMut,
    sent: usize,
}

/// Fixed ring of transmit slots.
///
/// Frames are encoded straight into the next free slot and leave the ring in
/// allocation order. A slot is only released once the link has accepted every
/// byte of its frame, so partial writes simply resume on the next drain.
#[derive(Debug)]
pub struct TxPool {
    slots: Vec<Slot>,
    head: usize,
    count: usize,
    config: FrameConfig,
}

impl TxPool {
    /// Create a pool of `depth` slots, each sized for the configured frame limit.
    pub fn new(depth: usize, config: FrameConfig) -> Result<Self> {
        config.validate()?;
        if depth == 0 {
            return Err(FrameError::InvalidConfig(
                "transmit pool needs at least one slot".to_string(),
            ));
        }
        let slots = (0..depth)
            .map(|_| Slot {
                buf: BytesMut::with_capacity(config.max_frame_len),
                sent: 0,
            })
            .collect();
        Ok(Self {
            slots,
            head: 0,
            count: 0,
            config,
        })
    }

    /// Allocate the next free slot and encode one frame into it.
    ///
    /// `fill` writes the payload that follows the message-type byte. The
    /// length field and end sentinel are patched in afterwards. If the pool is
    /// full nothing is encoded; if the result is too large the slot is left
    /// free. Returns the wire size of the queued frame.
    pub fn enqueue_with<F>(&mut self, message_type: u8, fill: F) -> Result<usize>
    where
        F: FnOnce(&mut BytesMut),
    {
        if self.is_full() {
            debug!(slots = self.slots.len(), "transmit pool exhausted");
            return Err(FrameError::PoolExhausted {
                slots: self.slots.len(),
            });
        }

        let max = self
            .config
            .max_frame_len
            .min(FRAME_OVERHEAD + MAX_LENGTH_FIELD);
        let idx = (self.head + self.count) % self.slots.len();
        let slot = &mut self.slots[idx];
        slot.buf.clear();
        slot.sent = 0;
        slot.buf.put_u8(START_OF_FRAME);
        slot.buf.put_u8(0);
        slot.buf.put_u8(self.config.protocol_id);
        slot.buf.put_u8(message_type);
        fill(&mut slot.buf);

        let total = slot.buf.len() + 1;
        if total > max {
            slot.buf.clear();
            return Err(FrameError::FrameTooLarge { size: total, max });
        }
        slot.buf[1] = (total - FRAME_OVERHEAD) as u8;
        slot.buf.put_u8(END_OF_FRAME);

        self.count += 1;
        debug!(message_type, size = total, slot = idx, in_use = self.count, "frame queued");
        Ok(total)
    }

    /// Queue a frame whose payload is already encoded.
    pub fn enqueue(&mut self, message_type: u8, payload: &[u8]) -> Result<usize> {
        self.enqueue_with(message_type, |buf| buf.put_slice(payload))
    }

    /// Offer the unsent remainder of the oldest frame to the link once.
    pub fn drain<L: SerialLink + ?Sized>(&mut self, link: &mut L) -> Result<DrainStatus> {
        if self.count == 0 {
            return Ok(DrainStatus::Idle);
        }

        let head = self.head;
        let slot = &mut self.slots[head];
        let total = slot.buf.len();
        let written = link.write_some(&slot.buf[slot.sent..])?;
        slot.sent += written;

        if slot.sent < total {
            trace!(sent = slot.sent, total, "partial frame write");
            return Ok(DrainStatus::Partial {
                sent: slot.sent,
                total,
            });
        }

        slot.buf.clear();
        slot.sent = 0;
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        debug!(slot = head, in_use = self.count, "frame transmitted");
        Ok(DrainStatus::Completed)
    }

    /// Number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding frames not yet fully transmitted.
    pub fn in_use(&self) -> usize {
        self.count
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Whether nothing is waiting to be transmitted.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Encoded bytes of queued frames, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).map(move |i| {
            let slot = &self.slots[(self.head + i) % self.slots.len()];
            slot.buf.as_ref()
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
