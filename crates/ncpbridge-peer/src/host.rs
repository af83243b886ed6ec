//! Application side of the bridge.

use ncpbridge_frame::{Frame, TxPool};
use ncpbridge_msg::confirm::*;
use ncpbridge_msg::request::*;
use ncpbridge_msg::{Confirm, Indication, Message, MessageKind, MessageType, Request};
use ncpbridge_transport::SerialLink;
use tracing::{debug, warn};

use crate::bridge::{enqueue_message, Bridge, TaskReport};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::registry::{confirm_handler, ConfirmHandler, IndicationCallbacks, PendingConfirms};

/// Generate a typed request function per confirm category.
macro_rules! typed_requests {
    ($( $(#[$meta:meta])* $name:ident($request:ident) -> $variant:ident($confirm:ident); )*) => {
        $(
            $(#[$meta])*
            pub fn $name<F>(&mut self, request: $request, on_confirm: F) -> Result<()>
            where
                F: FnOnce($confirm, &mut Requests<'_>) + 'static,
            {
                let handler = confirm_handler(move |confirm, requests| {
                    if let Confirm::$variant(confirm) = confirm {
                        on_confirm(confirm, requests);
                    }
                });
                self.request(Request::$variant(request), Some(handler))
            }
        )*
    };
}

/// The typed request and response functions of [`Host`] and [`Requests`].
macro_rules! host_requests {
    () => {
        typed_requests! {
            /// `NLDE-DATA.request`.
            data_request(DataRequest) -> Data(DataConfirm);
            auto_discovery_request(AutoDiscoveryRequest) -> AutoDiscovery(AutoDiscoveryConfirm);
            discovery_request(DiscoveryRequest) -> Discovery(DiscoveryConfirm);
            get_request(GetRequest) -> Get(GetConfirm);
            pair_request(PairRequest) -> Pair(PairConfirm);
            /// `NLME-RESET.request`; `set_default_nib` restores NIB defaults.
            reset_request(ResetRequest) -> Reset(ResetConfirm);
            rx_enable_request(RxEnableRequest) -> RxEnable(RxEnableConfirm);
            set_request(SetRequest) -> Set(SetConfirm);
            start_request(StartRequest) -> Start(StartConfirm);
            unpair_request(UnpairRequest) -> Unpair(UnpairConfirm);
            update_key_request(UpdateKeyRequest) -> UpdateKey(UpdateKeyConfirm);
            channel_agility_request(ChannelAgilityRequest) -> ChannelAgility(ChannelAgilityConfirm);
            zrc_command_request(ZrcCommandRequest) -> ZrcCommand(ZrcCommandConfirm);
            zrc_command_discovery_request(ZrcCommandDiscoveryRequest) -> ZrcCommandDiscovery(ZrcCommandDiscoveryConfirm);
            pbp_org_pair_request(PbpOrgPairRequest) -> PbpOrgPair(PbpOrgPairConfirm);
            pbp_rec_pair_request(PbpRecPairRequest) -> PbpRecPair(PbpRecPairConfirm);
            vendor_data_request(VendorDataRequest) -> VendorData(VendorDataConfirm);
        }

        pub fn discovery_response(&mut self, response: DiscoveryResponse) -> Result<()> {
            self.request(response.into(), None)
        }

        pub fn pair_response(&mut self, response: PairResponse) -> Result<()> {
            self.request(response.into(), None)
        }

        pub fn unpair_response(&mut self, response: UnpairResponse) -> Result<()> {
            self.request(response.into(), None)
        }

        pub fn zrc_command_discovery_response(
            &mut self,
            response: ZrcCommandDiscoveryResponse,
        ) -> Result<()> {
            self.request(response.into(), None)
        }
    };
}

/// Queues host requests into the transmit ring and records their confirm
/// handlers.
///
/// [`Host::task`] lends one to every confirm and indication handler it runs,
/// so a handler can issue its follow-up request (a start after the reset
/// confirm, a pair response to a pair indication) on the spot.
#[derive(Debug)]
pub struct Requests<'a> {
    pool: &'a mut TxPool,
    pending: &'a mut PendingConfirms,
}

impl<'a> Requests<'a> {
    pub fn new(pool: &'a mut TxPool, pending: &'a mut PendingConfirms) -> Self {
        Self { pool, pending }
    }

    /// Queue `request` and, for requests that expect a confirm, record
    /// `on_confirm` as the single outstanding handler of its category.
    ///
    /// Fails before anything is queued if a confirm-bearing request has no
    /// handler, if the message cannot be encoded, or if every transmit slot
    /// is busy. Responses ignore `on_confirm`.
    pub fn request(&mut self, request: Request, on_confirm: Option<ConfirmHandler>) -> Result<()> {
        let category = request.confirm_category();
        if let Some(category) = category {
            if on_confirm.is_none() {
                return Err(BridgeError::MissingCallback(category));
            }
        }

        enqueue_message(self.pool, &Message::Request(request))?;

        match (category, on_confirm) {
            (Some(category), Some(handler)) => {
                self.pending.set(category, handler);
            }
            (None, Some(_)) => debug!("response does not expect a confirm; handler dropped"),
            _ => {}
        }
        Ok(())
    }

    host_requests!();

    /// Whether a transmit slot is free.
    pub fn has_room(&self) -> bool {
        !self.pool.is_full()
    }
}

/// Host role: issues requests, receives confirms and indications.
///
/// Drive it by calling [`Host::task`] from the application's main loop.
/// Confirm and indication handlers run inside `task` and get a [`Requests`]
/// handle for anything they need to send.
pub struct Host<L> {
    bridge: Bridge<L>,
    pending: PendingConfirms,
    indications: IndicationCallbacks,
    dropped: u64,
}

impl<L: SerialLink> Host<L> {
    /// Host over `link` with default sizing.
    pub fn new(link: L) -> Result<Self> {
        Self::with_config(link, BridgeConfig::default())
    }

    pub fn with_config(link: L, config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            bridge: Bridge::with_config(link, config)?,
            pending: PendingConfirms::new(),
            indications: IndicationCallbacks::new(),
            dropped: 0,
        })
    }

    /// See [`Requests::request`].
    pub fn request(&mut self, request: Request, on_confirm: Option<ConfirmHandler>) -> Result<()> {
        self.requests().request(request, on_confirm)
    }

    host_requests!();

    /// Request handle over this host's transmit ring and confirm registry.
    pub fn requests(&mut self) -> Requests<'_> {
        Requests::new(self.bridge.pool_mut(), &mut self.pending)
    }

    /// Install indication handlers. Handlers left unset in `callbacks` keep
    /// whatever was registered before.
    pub fn register_indications(&mut self, callbacks: IndicationCallbacks) {
        self.indications.merge(callbacks);
        debug!(registered = ?self.indications.registered(), "indication handlers updated");
    }

    /// One polling cycle: assemble and dispatch at most one frame, then try
    /// to drain one transmit slot.
    pub fn task(&mut self) -> Result<TaskReport> {
        let dispatched = match self.bridge.poll_frame()? {
            Some(frame) => {
                let message_type = frame.message_type;
                self.dispatch(frame);
                Some(message_type)
            }
            None => None,
        };
        let drain = self.bridge.drain()?;
        Ok(TaskReport { dispatched, drain })
    }

    fn dispatch(&mut self, frame: Frame) {
        let Some(message_type) = MessageType::from_u8(frame.message_type) else {
            warn!(
                message_type = frame.message_type,
                "unrecognized message type; dropping frame"
            );
            self.dropped += 1;
            return;
        };

        match message_type.kind() {
            MessageKind::Confirm => match Confirm::decode(message_type, &frame.payload) {
                Ok(confirm) => self.deliver_confirm(confirm),
                Err(err) => self.drop_undecodable(message_type, &err),
            },
            MessageKind::Indication => match Indication::decode(message_type, &frame.payload) {
                Ok(indication) => {
                    let mut requests = Requests::new(self.bridge.pool_mut(), &mut self.pending);
                    if !self.indications.dispatch(indication, &mut requests) {
                        debug!(message = message_type.name(), "no indication handler; dropped");
                    }
                }
                Err(err) => self.drop_undecodable(message_type, &err),
            },
            MessageKind::Request | MessageKind::Response => {
                warn!(
                    message = message_type.name(),
                    "host-to-NCP message received by host; dropping"
                );
                self.dropped += 1;
            }
        }
    }

    fn deliver_confirm(&mut self, confirm: Confirm) {
        let category = confirm.category();
        match self.pending.take(category) {
            Some(handler) => {
                debug!(%category, status = %confirm.status(), "confirm delivered");
                handler(confirm, &mut self.requests());
            }
            None => debug!(%category, "no outstanding handler; confirm dropped"),
        }
    }

    fn drop_undecodable(&mut self, message_type: MessageType, err: &ncpbridge_msg::MsgError) {
        warn!(message = message_type.name(), %err, "undecodable payload; dropping frame");
        self.dropped += 1;
    }

    pub fn pending(&self) -> &PendingConfirms {
        &self.pending
    }

    /// Frames assembled correctly but discarded during dispatch.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn bridge(&self) -> &Bridge<L> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge<L> {
        &mut self.bridge
    }
}
