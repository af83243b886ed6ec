//! An in-process stand-in for the RF4CE network stack.
//!
//! [`EmulatedStack`] answers every request the NCP role can receive with a
//! plausible confirm, keeps a NIB and a pairing table, and can loop data
//! requests back as data indications. There is no radio: discovery finds
//! nothing and pairing always succeeds against a synthetic recipient.
//! Completions are queued and released from [`NetworkStack::poll`] as
//! transmit slots free up, so none are lost to a busy link.

use std::collections::{BTreeMap, VecDeque};

use ncpbridge_msg::confirm::*;
use ncpbridge_msg::indication::{CommStatusIndication, DataIndication, VendorDataIndication};
use ncpbridge_msg::request::*;
use ncpbridge_msg::types::{dev_type_list, profile_id_list, rx_flags};
use ncpbridge_msg::{
    AddrMode, Confirm, DevType, Indication, NibAttribute, NwkStatus, ProfileId, Request,
    UserString, VendorString,
};
use ncpbridge_peer::{NetworkStack, Outbox};
use tracing::debug;

/// Vendor id the emulator reports for itself and its synthetic peers.
pub const EMULATED_VENDOR_ID: u16 = 0xFFF1;

const DEFAULT_MAX_PAIRINGS: u8 = 5;
const LOOPBACK_LQI: u8 = 0xFF;

/// One pairing table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub ieee_addr: u64,
    pub pan_id: u16,
    pub logical_channel: u8,
}

#[derive(Debug)]
enum Outgoing {
    Confirm(Confirm),
    Indication(Indication),
}

/// Emulated network stack behind the NCP role.
#[derive(Debug)]
pub struct EmulatedStack {
    ieee_addr: u64,
    nib: BTreeMap<NibAttribute, Vec<u8>>,
    pairings: BTreeMap<u8, Pairing>,
    started: bool,
    loopback: bool,
    outgoing: VecDeque<Outgoing>,
    handled: u64,
}

impl EmulatedStack {
    /// Emulator with the given IEEE address and a default NIB.
    pub fn new(ieee_addr: u64) -> Self {
        Self {
            ieee_addr,
            nib: default_nib(ieee_addr),
            pairings: BTreeMap::new(),
            started: false,
            loopback: false,
            outgoing: VecDeque::new(),
            handled: 0,
        }
    }

    /// Echo every successful data and vendor-data request back as an
    /// indication on the same pairing.
    pub fn with_loopback(mut self, loopback: bool) -> Self {
        self.loopback = loopback;
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn pairings(&self) -> &BTreeMap<u8, Pairing> {
        &self.pairings
    }

    pub fn nib_value(&self, attribute: NibAttribute) -> Option<&[u8]> {
        self.nib.get(&attribute).map(Vec::as_slice)
    }

    /// Requests and responses handled so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Completions waiting for a transmit slot.
    pub fn backlog(&self) -> usize {
        self.outgoing.len()
    }

    fn confirm(&mut self, confirm: impl Into<Confirm>) {
        self.outgoing.push_back(Outgoing::Confirm(confirm.into()));
    }

    fn indicate(&mut self, indication: impl Into<Indication>) {
        self.outgoing
            .push_back(Outgoing::Indication(indication.into()));
    }

    fn pairing_status(&self, pairing_ref: u8) -> NwkStatus {
        if !self.started {
            NwkStatus::NOT_PERMITTED
        } else if self.pairings.contains_key(&pairing_ref) {
            NwkStatus::SUCCESS
        } else {
            NwkStatus::NO_PAIRING
        }
    }

    fn max_pairings(&self) -> u8 {
        self.nib
            .get(&NibAttribute::PRIVATE_MAX_PAIRING_TABLE_ENTRIES)
            .and_then(|value| value.first().copied())
            .unwrap_or(DEFAULT_MAX_PAIRINGS)
    }

    fn base_channel(&self) -> u8 {
        self.nib
            .get(&NibAttribute::BASE_CHANNEL)
            .and_then(|value| value.first().copied())
            .unwrap_or(15)
    }

    fn add_pairing(&mut self, preferred: Option<u8>, pairing: Pairing) -> Option<u8> {
        let max = self.max_pairings();
        let slot = match preferred {
            Some(r) if r < max && !self.pairings.contains_key(&r) => Some(r),
            _ => (0..max).find(|r| !self.pairings.contains_key(r)),
        }?;
        self.pairings.insert(slot, pairing);
        Some(slot)
    }

    fn handle_get(&mut self, req: GetRequest) {
        let confirm = if req.attribute == NibAttribute::PAIRING_TABLE {
            match self.pairings.get(&req.index) {
                Some(p) => GetConfirm {
                    status: NwkStatus::SUCCESS,
                    attribute: req.attribute,
                    index: req.index,
                    value: pairing_entry_bytes(p),
                },
                None => GetConfirm {
                    status: NwkStatus::INVALID_INDEX,
                    attribute: req.attribute,
                    index: req.index,
                    value: Vec::new(),
                },
            }
        } else {
            match self.nib.get(&req.attribute) {
                Some(value) => GetConfirm {
                    status: NwkStatus::SUCCESS,
                    attribute: req.attribute,
                    index: req.index,
                    value: value.clone(),
                },
                None => GetConfirm {
                    status: NwkStatus::UNSUPPORTED_ATTRIBUTE,
                    attribute: req.attribute,
                    index: req.index,
                    value: Vec::new(),
                },
            }
        };
        self.confirm(confirm);
    }

    fn handle_set(&mut self, req: SetRequest) {
        let status = if req.attribute == NibAttribute::PAIRING_TABLE
            || req.attribute.value_size().is_none()
        {
            NwkStatus::UNSUPPORTED_ATTRIBUTE
        } else if req.attribute.check_value(&req.value).is_err() {
            NwkStatus::INVALID_PARAMETER
        } else {
            self.nib.insert(req.attribute, req.value);
            NwkStatus::SUCCESS
        };
        self.confirm(SetConfirm {
            status,
            attribute: req.attribute,
            index: req.index,
        });
    }

    fn handle_pair(&mut self, req: PairRequest) {
        if !self.started {
            self.confirm(PairConfirm {
                status: NwkStatus::NOT_PERMITTED,
                pairing_ref: 0xFF,
                ..Default::default()
            });
            return;
        }
        let pairing = Pairing {
            ieee_addr: req.dst_ieee_addr,
            pan_id: req.dst_pan_id,
            logical_channel: req.logical_channel,
        };
        let confirm = match self.add_pairing(None, pairing) {
            Some(pairing_ref) => PairConfirm {
                status: NwkStatus::SUCCESS,
                pairing_ref,
                rec_vendor_id: EMULATED_VENDOR_ID,
                rec_vendor_string: VendorString::new("EMU"),
                rec_app_capabilities: 0x01,
                rec_user_string: UserString::new("emulated target"),
                rec_dev_types: dev_type_list(DevType::TELEVISION),
                rec_profiles: profile_id_list(ProfileId::ZRC),
            },
            None => PairConfirm {
                status: NwkStatus::NO_ORG_CAPACITY,
                pairing_ref: 0xFF,
                ..Default::default()
            },
        };
        self.confirm(confirm);
    }

    fn handle_pair_response(&mut self, resp: PairResponse) {
        let status = if !resp.status.is_success() {
            resp.status
        } else {
            let pairing = Pairing {
                ieee_addr: resp.dst_ieee_addr,
                pan_id: resp.dst_pan_id,
                logical_channel: self.base_channel(),
            };
            match self.add_pairing(Some(resp.prov_pairing_ref), pairing) {
                Some(_) => NwkStatus::SUCCESS,
                None => NwkStatus::NO_REC_CAPACITY,
            }
        };
        self.indicate(CommStatusIndication {
            status,
            pairing_ref: resp.prov_pairing_ref,
            dst_pan_id: resp.dst_pan_id,
            dst_addr_mode: AddrMode::IEEE,
            dst_addr: resp.dst_ieee_addr,
        });
    }

    fn handle_data(&mut self, req: DataRequest) {
        let status = self.pairing_status(req.pairing_ref);
        self.confirm(DataConfirm {
            status,
            pairing_ref: req.pairing_ref,
            profile_id: req.profile_id,
        });
        if status.is_success() && self.loopback {
            self.indicate(DataIndication {
                pairing_ref: req.pairing_ref,
                profile_id: req.profile_id,
                vendor_id: req.vendor_id,
                rx_lqi: LOOPBACK_LQI,
                rx_flags: rx_flags::UNICAST,
                nsdu: req.nsdu,
            });
        }
    }

    fn handle_vendor_data(&mut self, req: VendorDataRequest) {
        let status = self.pairing_status(req.pairing_ref);
        self.confirm(VendorDataConfirm {
            status,
            pairing_ref: req.pairing_ref,
        });
        if status.is_success() && self.loopback {
            self.indicate(VendorDataIndication {
                pairing_ref: req.pairing_ref,
                profile_id: req.profile_id,
                vendor_id: req.vendor_id,
                rx_lqi: LOOPBACK_LQI,
                rx_flags: rx_flags::VENDOR_SPECIFIC,
                nsdu: req.nsdu,
            });
        }
    }
}

impl Default for EmulatedStack {
    fn default() -> Self {
        Self::new(0x00_12_4B_00_00_00_00_01)
    }
}

impl NetworkStack for EmulatedStack {
    fn handle_request(&mut self, request: Request, _out: &mut Outbox<'_>) {
        self.handled += 1;
        debug!(message = request.message_type().name(), "emulated stack request");

        match request {
            Request::Reset(req) => {
                if req.set_default_nib {
                    self.nib = default_nib(self.ieee_addr);
                    self.pairings.clear();
                }
                self.started = false;
                self.confirm(ResetConfirm {
                    status: NwkStatus::SUCCESS,
                });
            }
            Request::Start(_) => {
                self.started = true;
                self.confirm(StartConfirm {
                    status: NwkStatus::SUCCESS,
                });
            }
            Request::RxEnable(_) => self.confirm(RxEnableConfirm {
                status: NwkStatus::SUCCESS,
            }),
            Request::Get(req) => self.handle_get(req),
            Request::Set(req) => self.handle_set(req),
            Request::Data(req) => self.handle_data(req),
            Request::VendorData(req) => self.handle_vendor_data(req),
            Request::Pair(req) => self.handle_pair(req),
            Request::PairResponse(resp) => self.handle_pair_response(resp),
            Request::Unpair(req) => {
                let status = self.pairing_status(req.pairing_ref);
                if status.is_success() {
                    self.pairings.remove(&req.pairing_ref);
                }
                self.confirm(UnpairConfirm {
                    status,
                    pairing_ref: req.pairing_ref,
                });
            }
            Request::UpdateKey(req) => {
                let status = self.pairing_status(req.pairing_ref);
                self.confirm(UpdateKeyConfirm {
                    status,
                    pairing_ref: req.pairing_ref,
                });
            }
            Request::ChannelAgility(_) => {
                let logical_channel = self.base_channel();
                self.confirm(ChannelAgilityConfirm {
                    status: NwkStatus::SUCCESS,
                    channel_changed: false,
                    logical_channel,
                });
            }
            Request::Discovery(_) => self.confirm(DiscoveryConfirm {
                status: NwkStatus::DISCOVERY_TIMEOUT,
                ..Default::default()
            }),
            Request::AutoDiscovery(_) => self.confirm(AutoDiscoveryConfirm {
                status: NwkStatus::DISCOVERY_TIMEOUT,
                src_ieee_addr: 0,
            }),
            Request::ZrcCommand(req) => {
                let status = self.pairing_status(req.pairing_ref);
                self.confirm(ZrcCommandConfirm {
                    status,
                    pairing_ref: req.pairing_ref,
                    rc_cmd: req.cmd_code,
                });
            }
            Request::ZrcCommandDiscovery(req) => {
                let status = self.pairing_status(req.pairing_ref);
                let supported_commands = if status.is_success() {
                    [0xFF; 32]
                } else {
                    [0; 32]
                };
                self.confirm(ZrcCommandDiscoveryConfirm {
                    status,
                    pairing_ref: req.pairing_ref,
                    supported_commands,
                });
            }
            Request::PbpOrgPair(_) => self.confirm(PbpOrgPairConfirm {
                status: NwkStatus::DISCOVERY_TIMEOUT,
                pairing_ref: 0xFF,
            }),
            Request::PbpRecPair(_) => self.confirm(PbpRecPairConfirm {
                status: NwkStatus::DISCOVERY_TIMEOUT,
                pairing_ref: 0xFF,
            }),
            Request::DiscoveryResponse(_)
            | Request::UnpairResponse(_)
            | Request::ZrcCommandDiscoveryResponse(_) => {}
        }
    }

    fn poll(&mut self, out: &mut Outbox<'_>) {
        while out.has_room() {
            let Some(next) = self.outgoing.pop_front() else {
                break;
            };
            match next {
                Outgoing::Confirm(confirm) => out.confirm(confirm),
                Outgoing::Indication(indication) => out.indicate(indication),
            };
        }
    }
}

fn default_nib(ieee_addr: u64) -> BTreeMap<NibAttribute, Vec<u8>> {
    let u32_le = |v: u32| v.to_le_bytes().to_vec();
    let u16_le = |v: u16| v.to_le_bytes().to_vec();
    BTreeMap::from([
        (NibAttribute::ACTIVE_PERIOD, u32_le(0x00FF_FFFF)),
        (NibAttribute::BASE_CHANNEL, vec![15]),
        (NibAttribute::DISCOVERY_LQI_THRESHOLD, vec![0xFF]),
        (NibAttribute::DISCOVERY_REPETITION_INTERVAL, u32_le(0x0000_F424)),
        (NibAttribute::DUTY_CYCLE, u32_le(0)),
        (NibAttribute::FRAME_COUNTER, u32_le(1)),
        (NibAttribute::INDICATE_DISCOVERY_REQUESTS, vec![0]),
        (NibAttribute::IN_POWER_SAVE, vec![0]),
        (NibAttribute::MAX_DISCOVERY_REPETITIONS, vec![1]),
        (NibAttribute::MAX_FIRST_ATTEMPT_CSMA_BACKOFFS, vec![4]),
        (NibAttribute::MAX_FIRST_ATTEMPT_FRAME_RETRIES, vec![3]),
        (NibAttribute::MAX_REPORTED_NODE_DESCRIPTORS, vec![3]),
        (NibAttribute::RESPONSE_WAIT_TIME, u32_le(0x0000_186A)),
        (NibAttribute::SCAN_DURATION, vec![6]),
        (NibAttribute::USER_STRING, UserString::new("ncpbridge").0.to_vec()),
        (NibAttribute::PRIVATE_IEEE_ADDR, ieee_addr.to_le_bytes().to_vec()),
        (NibAttribute::PRIVATE_VENDOR_IDENTIFIER, u16_le(EMULATED_VENDOR_ID)),
        (NibAttribute::PRIVATE_VENDOR_STRING, VendorString::new("EMU").0.to_vec()),
        (NibAttribute::PRIVATE_NODE_CAPABILITIES, vec![0x0F]),
        (NibAttribute::PRIVATE_PAN_IDENTIFIER, u16_le(0xFFFF)),
        (NibAttribute::PRIVATE_SHORT_ADDRESS, u16_le(0xFFFF)),
        (NibAttribute::PRIVATE_MAX_PAIRING_TABLE_ENTRIES, vec![DEFAULT_MAX_PAIRINGS]),
        (NibAttribute::PRIVATE_CH_AG_ENABLED, vec![1]),
        (NibAttribute::PRIVATE_CH_AG_SCAN_INTERVAL, u32_le(0x0083_D600)),
        (NibAttribute::PRIVATE_CH_AG_ED_THRESHOLD, vec![0x0A]),
        (NibAttribute::KEY_REPEAT_INTERVAL, vec![100]),
        (NibAttribute::KEY_REPEAT_WAIT_TIME, vec![200]),
        (NibAttribute::KEY_EXCHANGE_TRANSFER_COUNT, vec![36]),
    ])
}

/// Packed pairing-table entry as returned by a get of the pairing table.
fn pairing_entry_bytes(pairing: &Pairing) -> Vec<u8> {
    let mut out = Vec::with_capacity(ncpbridge_msg::nib::PAIRING_TABLE_ENTRY_LEN);
    out.extend_from_slice(&0xFFFEu16.to_le_bytes());
    out.push(pairing.logical_channel);
    out.extend_from_slice(&pairing.ieee_addr.to_le_bytes());
    out.extend_from_slice(&pairing.pan_id.to_le_bytes());
    out.extend_from_slice(&0xFFFEu16.to_le_bytes());
    out.push(0x00);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out
}
