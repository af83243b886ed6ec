use ncpbridge_frame::{DrainStatus, Frame, FrameReader, ReaderStats, TxPool};
use ncpbridge_msg::Message;
use ncpbridge_transport::SerialLink;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::error::Result;

/// What one call of a role's `task` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    /// Message-type byte of the frame dispatched this cycle, if any.
    pub dispatched: Option<u8>,
    /// Outcome of the drain attempt.
    pub drain: DrainStatus,
}

impl TaskReport {
    /// Nothing arrived and nothing was waiting to go out.
    pub fn is_idle(&self) -> bool {
        self.dispatched.is_none() && self.drain == DrainStatus::Idle
    }
}

/// State shared by both bridge roles: the link, the reassembly state machine
/// with its staging buffer, and the transmit ring.
///
/// One instance per link. Nothing here is global, so any number of bridges
/// can run side by side.
#[derive(Debug)]
pub struct Bridge<L> {
    link: L,
    reader: FrameReader,
    pool: TxPool,
    rx_buf: Vec<u8>,
    rx_pos: usize,
    rx_len: usize,
    config: BridgeConfig,
}

impl<L: SerialLink> Bridge<L> {
    /// Bridge over `link` with default sizing.
    pub fn new(link: L) -> Result<Self> {
        Self::with_config(link, BridgeConfig::default())
    }

    pub fn with_config(link: L, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        let frame_config = config.frame_config();
        Ok(Self {
            link,
            reader: FrameReader::with_config(frame_config),
            pool: TxPool::new(config.tx_slots, frame_config)?,
            rx_buf: vec![0; config.rx_chunk_len],
            rx_pos: 0,
            rx_len: 0,
            config,
        })
    }

    /// Assemble at most one frame.
    ///
    /// The link is read only once every previously staged byte has been fed
    /// to the reader; bytes after a completed frame stay staged for the next
    /// call.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        if self.rx_pos == self.rx_len {
            self.rx_pos = 0;
            self.rx_len = self.link.read_available(&mut self.rx_buf)?;
            if self.rx_len > 0 {
                trace!(bytes = self.rx_len, "link bytes staged");
            }
        }

        let (used, frame) = self.reader.push(&self.rx_buf[self.rx_pos..self.rx_len]);
        self.rx_pos += used;
        if let Some(frame) = &frame {
            debug!(
                message_type = frame.message_type,
                payload = frame.payload.len(),
                "frame assembled"
            );
        }
        Ok(frame)
    }

    /// Encode `message` into the next free transmit slot.
    ///
    /// Fails without touching the ring if the message cannot be represented
    /// or no slot is free. Returns the queued frame's wire size.
    pub fn enqueue(&mut self, message: &Message) -> Result<usize> {
        enqueue_message(&mut self.pool, message)
    }

    /// Offer the oldest queued frame to the link once.
    pub fn drain(&mut self) -> Result<DrainStatus> {
        Ok(self.pool.drain(&mut self.link)?)
    }

    /// Bytes read from the link but not yet fed to the reader.
    pub fn staged(&self) -> usize {
        self.rx_len - self.rx_pos
    }

    pub fn reader_stats(&self) -> ReaderStats {
        self.reader.stats()
    }

    pub fn pool(&self) -> &TxPool {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut TxPool {
        &mut self.pool
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Tear down the bridge, returning the link. Queued frames are discarded.
    pub fn into_link(self) -> L {
        self.link
    }
}

/// Check and encode one message into `pool`.
pub(crate) fn enqueue_message(pool: &mut TxPool, message: &Message) -> Result<usize> {
    message.check()?;
    let message_type = message.message_type();
    let size = pool.enqueue_with(message_type.as_u8(), |buf| message.encode_payload(buf))?;
    debug!(message = message_type.name(), size, "message queued");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use ncpbridge_frame::FrameError;
    use ncpbridge_msg::request::{ResetRequest, SetRequest};
    use ncpbridge_msg::{NibAttribute, Request};
    use ncpbridge_transport::{LinkProfile, MemoryLink};

    use super::*;
    use crate::error::BridgeError;

    const RESET_TRUE: [u8; 6] = [0x01, 0x03, 0x01, 0x07, 0x01, 0x04];

    fn reset(flag: bool) -> Message {
        Message::Request(Request::Reset(ResetRequest {
            set_default_nib: flag,
        }))
    }

    #[test]
    fn enqueue_and_drain_write_the_frame() {
        let (near, mut far) = MemoryLink::pair(LinkProfile::unlimited());
        let mut bridge = Bridge::new(near).unwrap();

        assert_eq!(bridge.enqueue(&reset(true)).unwrap(), 6);
        assert_eq!(bridge.drain().unwrap(), DrainStatus::Completed);

        let mut buf = [0u8; 16];
        let n = far.read_available(&mut buf).unwrap();
        assert_eq!(&buf[..n], &RESET_TRUE);
    }

    #[test]
    fn one_frame_per_poll_even_when_more_are_staged() {
        let (near, _far) = MemoryLink::pair(LinkProfile::unlimited());
        let mut bridge = Bridge::new(near).unwrap();
        let mut two = RESET_TRUE.to_vec();
        two.extend_from_slice(&RESET_TRUE);
        bridge.link().inject(&two);

        let first = bridge.poll_frame().unwrap().unwrap();
        assert_eq!(first.message_type, 0x07);
        assert_eq!(bridge.staged(), RESET_TRUE.len());

        let second = bridge.poll_frame().unwrap().unwrap();
        assert_eq!(second.payload.as_ref(), &[0x01]);
        assert_eq!(bridge.staged(), 0);
    }

    #[test]
    fn frame_split_across_reads() {
        let (near, _far) = MemoryLink::pair(LinkProfile::chunked(2, 2));
        let mut bridge = Bridge::new(near).unwrap();
        bridge.link().inject(&RESET_TRUE);

        assert!(bridge.poll_frame().unwrap().is_none());
        assert!(bridge.poll_frame().unwrap().is_none());
        let frame = bridge.poll_frame().unwrap().unwrap();
        assert_eq!(frame.message_type, 0x07);
    }

    #[test]
    fn invalid_message_never_takes_a_slot() {
        let (near, _far) = MemoryLink::pair(LinkProfile::unlimited());
        let mut bridge = Bridge::new(near).unwrap();
        let bad = Message::Request(Request::Set(SetRequest {
            attribute: NibAttribute::ACTIVE_PERIOD,
            index: 0,
            value: vec![1],
        }));

        assert!(matches!(bridge.enqueue(&bad), Err(BridgeError::Msg(_))));
        assert!(bridge.pool().is_empty());
    }

    #[test]
    fn full_ring_is_reported() {
        let (near, _far) = MemoryLink::pair(LinkProfile::unlimited());
        let mut bridge = Bridge::new(near).unwrap();
        bridge.enqueue(&reset(false)).unwrap();
        bridge.enqueue(&reset(false)).unwrap();

        let err = bridge.enqueue(&reset(false)).unwrap_err();
        assert!(err.is_pool_exhausted());
        assert!(matches!(
            err,
            BridgeError::Frame(FrameError::PoolExhausted { slots: 2 })
        ));
    }

    #[test]
    fn closed_link_surfaces_once_staged_bytes_are_used() {
        let (near, far) = MemoryLink::pair(LinkProfile::unlimited());
        let mut bridge = Bridge::new(near).unwrap();
        far.close();
        assert!(matches!(
            bridge.poll_frame(),
            Err(BridgeError::Transport(_))
        ));
    }

    #[test]
    fn task_report_idle() {
        let report = TaskReport {
            dispatched: None,
            drain: DrainStatus::Idle,
        };
        assert!(report.is_idle());
        let busy = TaskReport {
            dispatched: Some(0x18),
            drain: DrainStatus::Idle,
        };
        assert!(!busy.is_idle());
    }
}
