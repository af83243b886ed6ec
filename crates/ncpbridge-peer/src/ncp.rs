//! Co-processor side of the bridge.

use ncpbridge_frame::{Frame, TxPool};
use ncpbridge_msg::{Confirm, Indication, Message, MessageType, Request};
use ncpbridge_transport::SerialLink;
use tracing::{debug, warn};

use crate::bridge::{enqueue_message, Bridge, TaskReport};
use crate::config::BridgeConfig;
use crate::error::Result;

/// The network stack the NCP fronts.
///
/// The bridge decodes each host request and hands it over; the stack answers
/// through the [`Outbox`], either immediately or from a later
/// [`poll`](NetworkStack::poll) once the primitive completes.
pub trait NetworkStack {
    /// Start executing one host request or response.
    fn handle_request(&mut self, request: Request, out: &mut Outbox<'_>);

    /// Called once per polling cycle, after dispatch and before the drain.
    fn poll(&mut self, out: &mut Outbox<'_>) {
        let _ = out;
    }
}

/// Encodes confirms and indications into the NCP's transmit ring.
///
/// Emission never blocks: a message that does not fit is logged and dropped.
/// Stacks that must not lose a confirm should check [`Outbox::has_room`]
/// first and retry from a later poll.
#[derive(Debug)]
pub struct Outbox<'a> {
    pool: &'a mut TxPool,
    sent: usize,
    dropped: usize,
}

impl<'a> Outbox<'a> {
    /// Outbox writing into `pool`. [`Ncp`] builds one per dispatch and poll.
    pub fn new(pool: &'a mut TxPool) -> Self {
        Self {
            pool,
            sent: 0,
            dropped: 0,
        }
    }

    pub fn confirm(&mut self, confirm: impl Into<Confirm>) -> bool {
        self.emit(Message::Confirm(confirm.into()))
    }

    pub fn indicate(&mut self, indication: impl Into<Indication>) -> bool {
        self.emit(Message::Indication(indication.into()))
    }

    /// Whether a transmit slot is free.
    pub fn has_room(&self) -> bool {
        !self.pool.is_full()
    }

    /// Messages queued through this outbox.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Messages this outbox had to drop.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn emit(&mut self, message: Message) -> bool {
        match enqueue_message(self.pool, &message) {
            Ok(_) => {
                self.sent += 1;
                true
            }
            Err(err) => {
                warn!(
                    message = message.message_type().name(),
                    %err,
                    "dropping outbound NCP message"
                );
                self.dropped += 1;
                false
            }
        }
    }
}

/// NCP role: executes host requests on a [`NetworkStack`] and sends back
/// its confirms and indications.
#[derive(Debug)]
pub struct Ncp<L, S> {
    bridge: Bridge<L>,
    stack: S,
    dropped_frames: u64,
    dropped_messages: u64,
}

impl<L: SerialLink, S: NetworkStack> Ncp<L, S> {
    pub fn new(link: L, stack: S) -> Result<Self> {
        Self::with_config(link, stack, BridgeConfig::default())
    }

    pub fn with_config(link: L, stack: S, config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            bridge: Bridge::with_config(link, config)?,
            stack,
            dropped_frames: 0,
            dropped_messages: 0,
        })
    }

    /// One polling cycle: dispatch at most one host frame, let the stack
    /// emit completions, then try to drain one transmit slot.
    pub fn task(&mut self) -> Result<TaskReport> {
        let dispatched = match self.bridge.poll_frame()? {
            Some(frame) => {
                let message_type = frame.message_type;
                self.dispatch(frame);
                Some(message_type)
            }
            None => None,
        };

        let mut out = Outbox::new(self.bridge.pool_mut());
        self.stack.poll(&mut out);
        self.dropped_messages += out.dropped as u64;

        let drain = self.bridge.drain()?;
        Ok(TaskReport { dispatched, drain })
    }

    fn dispatch(&mut self, frame: Frame) {
        let Some(message_type) = MessageType::from_u8(frame.message_type) else {
            warn!(
                message_type = frame.message_type,
                "unrecognized message type; dropping frame"
            );
            self.dropped_frames += 1;
            return;
        };

        if !message_type.kind().host_to_ncp() {
            warn!(
                message = message_type.name(),
                "NCP-to-host message received by NCP; dropping"
            );
            self.dropped_frames += 1;
            return;
        }

        match Request::decode(message_type, &frame.payload) {
            Ok(request) => {
                debug!(message = message_type.name(), "request dispatched");
                let mut out = Outbox::new(self.bridge.pool_mut());
                self.stack.handle_request(request, &mut out);
                self.dropped_messages += out.dropped as u64;
            }
            Err(err) => {
                warn!(message = message_type.name(), %err, "undecodable request; dropping frame");
                self.dropped_frames += 1;
            }
        }
    }

    /// Emit an unsolicited indication, for events the stack raises outside
    /// [`NetworkStack::poll`]. Returns `false` if it was dropped.
    pub fn indicate(&mut self, indication: impl Into<Indication>) -> bool {
        let mut out = Outbox::new(self.bridge.pool_mut());
        let sent = out.indicate(indication);
        self.dropped_messages += out.dropped as u64;
        sent
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn bridge(&self) -> &Bridge<L> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge<L> {
        &mut self.bridge
    }

    /// Frames assembled correctly but discarded during dispatch.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Confirms and indications lost to a full transmit ring.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }
}
