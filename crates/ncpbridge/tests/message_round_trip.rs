#![cfg(feature = "peer")]

//! Every message type, with distinct non-zero field values, carried across
//! links that deliver a few bytes at a time and decoded by the far role.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ncpbridge::msg::confirm::*;
use ncpbridge::msg::indication::*;
use ncpbridge::msg::request::*;
use ncpbridge::msg::types::{tx_options, DevTypeList, ProfileIdList};
use ncpbridge::msg::{
    AddrMode, AgilityMode, Confirm, DevType, Indication, Message, MessageKind, MessageType,
    NibAttribute, NodeDesc, NodeList, NwkStatus, ProfileId, Request, UserString, VendorString,
};
use ncpbridge::peer::{confirm_handler, Host, IndicationCallbacks, Ncp, NetworkStack, Outbox};
use ncpbridge::transport::{LinkProfile, MemoryLink};

const CHUNKS: [usize; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 64];

type Received = Rc<RefCell<Vec<Message>>>;

/// Records host requests and sends whatever the test queues.
#[derive(Debug, Default)]
struct Recorder {
    requests: Vec<Request>,
    outgoing: VecDeque<Message>,
}

impl NetworkStack for Recorder {
    fn handle_request(&mut self, request: Request, _out: &mut Outbox<'_>) {
        self.requests.push(request);
    }

    fn poll(&mut self, out: &mut Outbox<'_>) {
        while out.has_room() {
            let Some(message) = self.outgoing.pop_front() else {
                break;
            };
            match message {
                Message::Confirm(confirm) => out.confirm(confirm),
                Message::Indication(indication) => out.indicate(indication),
                Message::Request(request) => panic!("stack cannot send {request:?}"),
            };
        }
    }
}

struct Rig {
    host: Host<MemoryLink>,
    ncp: Ncp<MemoryLink, Recorder>,
    received: Received,
}

impl Rig {
    fn new(chunk: usize) -> Self {
        let (host_link, ncp_link) = MemoryLink::pair_with(
            LinkProfile::chunked(chunk, chunk),
            LinkProfile::chunked(chunk, chunk),
        );
        let received: Received = Rc::default();
        let mut host = Host::new(host_link).expect("host");
        host.register_indications(record_indications(&received));
        Self {
            host,
            ncp: Ncp::new(ncp_link, Recorder::default()).expect("ncp"),
            received,
        }
    }

    fn pump_until(&mut self, label: &str, done: impl Fn(&Rig) -> bool) {
        for _ in 0..2_000 {
            if done(&*self) {
                return;
            }
            self.host.task().expect("host task");
            self.ncp.task().expect("ncp task");
        }
        panic!("{label}: nothing arrived");
    }

    fn assert_clean(&self, label: &str) {
        assert_eq!(self.host.dropped(), 0, "{label}");
        assert_eq!(self.ncp.dropped_frames(), 0, "{label}");
        assert_eq!(self.ncp.dropped_messages(), 0, "{label}");
        assert_eq!(self.host.bridge().reader_stats().skipped_bytes, 0, "{label}");
        assert_eq!(self.ncp.bridge().reader_stats().skipped_bytes, 0, "{label}");
    }
}

fn record_indications(sink: &Received) -> IndicationCallbacks {
    macro_rules! record {
        ($( $setter:ident ),*) => {
            IndicationCallbacks::new()
                $(
                    .$setter({
                        let sink = Rc::clone(sink);
                        move |ind, _| sink.borrow_mut().push(Message::Indication(ind.into()))
                    })
                )*
        };
    }
    record!(
        on_data,
        on_comm_status,
        on_discovery,
        on_pair,
        on_unpair,
        on_channel_agility,
        on_zrc_command,
        on_zrc_command_discovery,
        on_vendor_data
    )
}

fn dev_types() -> DevTypeList {
    [DevType::REMOTE_CONTROL, DevType::TELEVISION, DevType::SET_TOP_BOX]
}

fn profiles() -> ProfileIdList {
    [
        ProfileId::ZRC,
        ProfileId::ZID,
        ProfileId::VENDOR_DATA,
        ProfileId(0x10),
        ProfileId(0x11),
        ProfileId(0x12),
        ProfileId(0x13),
    ]
}

fn bitmap(seed: u8) -> [u8; 32] {
    std::array::from_fn(|i| (i as u8).wrapping_mul(7) ^ seed)
}

fn node(lqi: u8) -> NodeDesc {
    NodeDesc {
        status: NwkStatus::DISCOVERY_TIMEOUT,
        logical_channel: 25,
        pan_id: 0xBEEF,
        ieee_addr: 0x0011_2233_4455_6600 | u64::from(lqi),
        node_capabilities: 0x0F,
        vendor_id: 0x1014,
        vendor_string: VendorString::new("ATMEL"),
        app_capabilities: 0x13,
        user_string: UserString::new("living room"),
        dev_types: dev_types(),
        profiles: profiles(),
        disc_req_lqi: lqi,
    }
}

/// A populated message of `message_type`.
fn sample(message_type: MessageType) -> Message {
    use MessageType::*;
    match message_type {
        NldeDataRequest => Message::Request(
            DataRequest {
                pairing_ref: 3,
                profile_id: ProfileId::ZRC,
                vendor_id: 0x10F1,
                tx_options: tx_options::ACK_REQ | tx_options::SEC_REQ,
                nsdu: b"volume up".to_vec(),
            }
            .into(),
        ),
        NlmeAutoDiscoveryRequest => Message::Request(
            AutoDiscoveryRequest {
                rec_app_capabilities: 0x13,
                rec_dev_types: dev_types(),
                rec_profiles: profiles(),
                duration: 0x0001_E848,
            }
            .into(),
        ),
        NlmeDiscoveryRequest => Message::Request(
            DiscoveryRequest {
                dst_pan_id: 0xFFFE,
                dst_nwk_addr: 0xFFFD,
                org_app_capabilities: 0x11,
                org_dev_types: dev_types(),
                org_profiles: profiles(),
                search_dev_type: DevType::TELEVISION,
                disc_profile_count: 2,
                disc_profiles: profiles(),
                duration: 0x0003_0D40,
            }
            .into(),
        ),
        NlmeDiscoveryResponse => Message::Request(
            DiscoveryResponse {
                status: NwkStatus::NO_REC_CAPACITY,
                dst_ieee_addr: 0x0102_0304_0506_0708,
                rec_app_capabilities: 0x21,
                rec_dev_types: dev_types(),
                rec_profiles: profiles(),
                disc_req_lqi: 0xC8,
            }
            .into(),
        ),
        NlmeGetRequest => Message::Request(
            GetRequest {
                attribute: NibAttribute::PRIVATE_PAN_IDENTIFIER,
                index: 2,
            }
            .into(),
        ),
        NlmePairRequest => Message::Request(
            PairRequest {
                logical_channel: 20,
                dst_pan_id: 0x1234,
                dst_ieee_addr: 0x0011_2233_4455_6677,
                org_app_capabilities: 0x13,
                org_dev_types: dev_types(),
                org_profiles: profiles(),
                key_ex_transfer_count: 36,
            }
            .into(),
        ),
        NlmePairResponse => Message::Request(
            PairResponse {
                status: NwkStatus::DUPLICATE_PAIRING,
                dst_pan_id: 0x4321,
                dst_ieee_addr: 0x8877_6655_4433_2211,
                rec_app_capabilities: 0x31,
                rec_dev_types: dev_types(),
                rec_profiles: profiles(),
                prov_pairing_ref: 4,
            }
            .into(),
        ),
        NlmeResetRequest => Message::Request(
            ResetRequest {
                set_default_nib: true,
            }
            .into(),
        ),
        NlmeRxEnableRequest => Message::Request(
            RxEnableRequest {
                rx_on_duration: 0x00FF_FFFF,
            }
            .into(),
        ),
        NlmeSetRequest => Message::Request(
            SetRequest {
                attribute: NibAttribute::PRIVATE_IEEE_ADDR,
                index: 1,
                value: vec![1, 2, 3, 4, 5, 6, 7, 8],
            }
            .into(),
        ),
        NlmeStartRequest => Message::Request(StartRequest {}.into()),
        NlmeUnpairRequest => Message::Request(UnpairRequest { pairing_ref: 4 }.into()),
        NlmeUnpairResponse => Message::Request(UnpairResponse { pairing_ref: 5 }.into()),
        NlmeUpdateKeyRequest => Message::Request(
            UpdateKeyRequest {
                pairing_ref: 6,
                link_key: std::array::from_fn(|i| 0xA0 + i as u8),
            }
            .into(),
        ),
        NwkChAgilityRequest => Message::Request(
            ChannelAgilityRequest {
                mode: AgilityMode::PERIODIC,
            }
            .into(),
        ),
        ZrcCmdRequest => Message::Request(
            ZrcCommandRequest {
                pairing_ref: 7,
                vendor_id: 0x1014,
                cmd_code: 0x01,
                tx_options: tx_options::ACK_REQ,
                cmd_payload: vec![0x41, 0x42],
            }
            .into(),
        ),
        ZrcCmdDiscoveryRequest => {
            Message::Request(ZrcCommandDiscoveryRequest { pairing_ref: 8 }.into())
        }
        ZrcCmdDiscoveryResponse => Message::Request(
            ZrcCommandDiscoveryResponse {
                pairing_ref: 9,
                supported_commands: bitmap(0x5A),
            }
            .into(),
        ),
        PbpOrgPairRequest => Message::Request(
            ncpbridge::msg::request::PbpOrgPairRequest {
                org_app_capabilities: 0x15,
                org_dev_types: dev_types(),
                org_profiles: profiles(),
                search_dev_type: DevType::SET_TOP_BOX,
                disc_profile_count: 1,
                disc_profiles: profiles(),
            }
            .into(),
        ),
        PbpRecPairRequest => Message::Request(
            ncpbridge::msg::request::PbpRecPairRequest {
                rec_app_capabilities: 0x17,
                rec_dev_types: dev_types(),
                rec_profiles: profiles(),
            }
            .into(),
        ),
        VendorDataRequest => Message::Request(
            ncpbridge::msg::request::VendorDataRequest {
                pairing_ref: 10,
                profile_id: ProfileId::VENDOR_DATA,
                vendor_id: 0xFFF1,
                tx_options: tx_options::VENDOR_SPECIFIC,
                nsdu: b"vendor".to_vec(),
            }
            .into(),
        ),
        NldeDataIndication => Message::Indication(
            DataIndication {
                pairing_ref: 11,
                profile_id: ProfileId::ZRC,
                vendor_id: 0x1015,
                rx_lqi: 0xB4,
                rx_flags: 0x03,
                nsdu: b"channel 7".to_vec(),
            }
            .into(),
        ),
        NldeDataConfirm => Message::Confirm(
            DataConfirm {
                status: NwkStatus::MAC_NO_ACK,
                pairing_ref: 12,
                profile_id: ProfileId::ZID,
            }
            .into(),
        ),
        NlmeAutoDiscoveryConfirm => Message::Confirm(
            AutoDiscoveryConfirm {
                status: NwkStatus::DISCOVERY_TIMEOUT,
                src_ieee_addr: 0x1122_3344_5566_7788,
            }
            .into(),
        ),
        NlmeCommStatusIndication => Message::Indication(
            CommStatusIndication {
                status: NwkStatus::SECURITY_TIMEOUT,
                pairing_ref: 13,
                dst_pan_id: 0x5678,
                dst_addr_mode: AddrMode::IEEE,
                dst_addr: 0x0A0B_0C0D_0E0F_1011,
            }
            .into(),
        ),
        NlmeDiscoveryIndication => Message::Indication(
            DiscoveryIndication {
                status: NwkStatus::NOT_PERMITTED,
                src_ieee_addr: 0x2233_4455_6677_8899,
                org_node_capabilities: 0x0D,
                org_vendor_id: 0x1016,
                org_vendor_string: VendorString::new("VENDOR"),
                org_app_capabilities: 0x23,
                org_user_string: UserString::new("remote"),
                org_dev_types: dev_types(),
                org_profiles: profiles(),
                search_dev_type: DevType::MEDIA_CENTER,
                rx_lqi: 0x99,
            }
            .into(),
        ),
        NlmeDiscoveryConfirm => Message::Confirm(
            DiscoveryConfirm {
                status: NwkStatus::DISCOVERY_ERROR,
                nodes: NodeList(vec![node(0x51), node(0x52), node(0x53)]),
            }
            .into(),
        ),
        NlmeGetConfirm => Message::Confirm(
            GetConfirm {
                status: NwkStatus::INVALID_INDEX,
                attribute: NibAttribute::PRIVATE_PAN_IDENTIFIER,
                index: 2,
                value: vec![0xCD, 0xAB],
            }
            .into(),
        ),
        NlmePairIndication => Message::Indication(
            PairIndication {
                status: NwkStatus::NO_ORG_CAPACITY,
                src_pan_id: 0x9ABC,
                src_ieee_addr: 0x3344_5566_7788_99AA,
                org_node_capabilities: 0x0B,
                org_vendor_id: 0x1017,
                org_vendor_string: VendorString::new("ACME"),
                org_app_capabilities: 0x25,
                org_user_string: UserString::new("kitchen"),
                org_dev_types: dev_types(),
                org_profiles: profiles(),
                key_ex_transfer_count: 40,
                prov_pairing_ref: 14,
            }
            .into(),
        ),
        NlmePairConfirm => Message::Confirm(
            PairConfirm {
                status: NwkStatus::NO_RESPONSE,
                pairing_ref: 15,
                rec_vendor_id: 0x1018,
                rec_vendor_string: VendorString::new("TVCO"),
                rec_app_capabilities: 0x27,
                rec_user_string: UserString::new("lounge tv"),
                rec_dev_types: dev_types(),
                rec_profiles: profiles(),
            }
            .into(),
        ),
        NlmeResetConfirm => Message::Confirm(
            ResetConfirm {
                status: NwkStatus::INVALID_PARAMETER,
            }
            .into(),
        ),
        NlmeRxEnableConfirm => Message::Confirm(
            RxEnableConfirm {
                status: NwkStatus::MAC_TX_ACTIVE,
            }
            .into(),
        ),
        NlmeSetConfirm => Message::Confirm(
            SetConfirm {
                status: NwkStatus::UNSUPPORTED_ATTRIBUTE,
                attribute: NibAttribute::PRIVATE_IEEE_ADDR,
                index: 1,
            }
            .into(),
        ),
        NlmeStartConfirm => Message::Confirm(
            StartConfirm {
                status: NwkStatus::MAC_NO_BEACON,
            }
            .into(),
        ),
        NlmeUnpairConfirm => Message::Confirm(
            UnpairConfirm {
                status: NwkStatus::NO_PAIRING,
                pairing_ref: 16,
            }
            .into(),
        ),
        NlmeUnpairIndication => Message::Indication(UnpairIndication { pairing_ref: 17 }.into()),
        NlmeUpdateKeyConfirm => Message::Confirm(
            UpdateKeyConfirm {
                status: NwkStatus::SECURITY_FAILURE,
                pairing_ref: 18,
            }
            .into(),
        ),
        NwkChAgilityIndication => Message::Indication(
            ChannelAgilityIndication {
                logical_channel: 15,
            }
            .into(),
        ),
        NwkChAgilityConfirm => Message::Confirm(
            ChannelAgilityConfirm {
                status: NwkStatus::MAC_CHANNEL_ACCESS_FAILURE,
                channel_changed: true,
                logical_channel: 20,
            }
            .into(),
        ),
        ZrcCmdConfirm => Message::Confirm(
            ZrcCommandConfirm {
                status: NwkStatus::MAC_NO_ACK,
                pairing_ref: 19,
                rc_cmd: 0x41,
            }
            .into(),
        ),
        ZrcCmdIndication => Message::Indication(
            ZrcCommandIndication {
                pairing_ref: 20,
                rx_lqi: 0x77,
                rx_flags: 0x05,
                cmd_payload: vec![0x01, 0x41, 0x00],
            }
            .into(),
        ),
        ZrcCmdDiscoveryConfirm => Message::Confirm(
            ZrcCommandDiscoveryConfirm {
                status: NwkStatus::FRAME_COUNTER_EXPIRED,
                pairing_ref: 21,
                supported_commands: bitmap(0xA5),
            }
            .into(),
        ),
        ZrcCmdDiscoveryIndication => {
            Message::Indication(ZrcCommandDiscoveryIndication { pairing_ref: 22 }.into())
        }
        PbpOrgPairConfirm => Message::Confirm(
            ncpbridge::msg::confirm::PbpOrgPairConfirm {
                status: NwkStatus::MAC_TRANSACTION_EXPIRED,
                pairing_ref: 23,
            }
            .into(),
        ),
        PbpRecPairConfirm => Message::Confirm(
            ncpbridge::msg::confirm::PbpRecPairConfirm {
                status: NwkStatus::MAC_TRANSACTION_OVERFLOW,
                pairing_ref: 24,
            }
            .into(),
        ),
        VendorDataConfirm => Message::Confirm(
            ncpbridge::msg::confirm::VendorDataConfirm {
                status: NwkStatus::MAC_INVALID_ADDRESS,
                pairing_ref: 25,
            }
            .into(),
        ),
        VendorDataIndication => Message::Indication(
            ncpbridge::msg::indication::VendorDataIndication {
                pairing_ref: 26,
                profile_id: ProfileId::VENDOR_DATA,
                vendor_id: 0xFFF2,
                rx_lqi: 0x66,
                rx_flags: 0x01,
                nsdu: b"firmware 1.2".to_vec(),
            }
            .into(),
        ),
    }
}

fn sample_request(message_type: MessageType) -> Request {
    match sample(message_type) {
        Message::Request(request) => request,
        other => panic!("{message_type} sample is {other:?}"),
    }
}

/// The request whose confirm `category` completes.
fn request_for(confirm: &Confirm) -> Request {
    let category = confirm.category();
    let message_type = MessageType::ALL
        .iter()
        .copied()
        .find(|ty| ty.kind() == MessageKind::Request && ty.category() == Some(category))
        .expect("every confirm has a request");
    sample_request(message_type)
}

fn types_of(kind: MessageKind) -> impl Iterator<Item = MessageType> {
    MessageType::ALL
        .iter()
        .copied()
        .filter(move |ty| ty.kind() == kind)
}

#[test]
fn samples_match_their_type_and_fill_a_frame_legally() {
    for &message_type in MessageType::ALL {
        let message = sample(message_type);
        assert_eq!(message.message_type(), message_type);
        message.check().unwrap();
    }
    assert_eq!(types_of(MessageKind::Request).count(), 17);
    assert_eq!(types_of(MessageKind::Response).count(), 4);
    assert_eq!(types_of(MessageKind::Confirm).count(), 17);
    assert_eq!(types_of(MessageKind::Indication).count(), 9);
}

#[test]
fn every_host_message_reaches_the_stack_intact() {
    let host_types = types_of(MessageKind::Request).chain(types_of(MessageKind::Response));
    for message_type in host_types {
        for chunk in CHUNKS {
            let label = format!("{message_type} over {chunk}-byte chunks");
            let mut rig = Rig::new(chunk);
            let request = sample_request(message_type);
            let handler = request
                .confirm_category()
                .map(|_| confirm_handler(|_, _| {}));

            rig.host.request(request.clone(), handler).unwrap();
            rig.pump_until(&label, |rig| !rig.ncp.stack().requests.is_empty());

            assert_eq!(rig.ncp.stack().requests, vec![request], "{label}");
            rig.assert_clean(&label);
        }
    }
}

#[test]
fn every_confirm_reaches_its_handler_intact() {
    for message_type in types_of(MessageKind::Confirm) {
        for chunk in CHUNKS {
            let label = format!("{message_type} over {chunk}-byte chunks");
            let mut rig = Rig::new(chunk);
            let Message::Confirm(confirm) = sample(message_type) else {
                unreachable!()
            };
            let request = request_for(&confirm);

            let sink = Rc::clone(&rig.received);
            rig.host
                .request(
                    request.clone(),
                    Some(confirm_handler(move |confirm, _| {
                        sink.borrow_mut().push(Message::Confirm(confirm))
                    })),
                )
                .unwrap();
            rig.ncp
                .stack_mut()
                .outgoing
                .push_back(Message::Confirm(confirm.clone()));
            rig.pump_until(&label, |rig| {
                !rig.received.borrow().is_empty() && !rig.ncp.stack().requests.is_empty()
            });

            assert_eq!(*rig.received.borrow(), vec![Message::Confirm(confirm)], "{label}");
            assert_eq!(rig.ncp.stack().requests, vec![request], "{label}");
            assert!(rig.host.pending().pending().next().is_none(), "{label}");
            rig.assert_clean(&label);
        }
    }
}

#[test]
fn every_indication_reaches_its_handler_intact() {
    for message_type in types_of(MessageKind::Indication) {
        for chunk in CHUNKS {
            let label = format!("{message_type} over {chunk}-byte chunks");
            let mut rig = Rig::new(chunk);
            let indication = sample(message_type);

            rig.ncp.stack_mut().outgoing.push_back(indication.clone());
            rig.pump_until(&label, |rig| !rig.received.borrow().is_empty());

            assert_eq!(*rig.received.borrow(), vec![indication], "{label}");
            rig.assert_clean(&label);
        }
    }
}

#[test]
fn back_to_back_traffic_keeps_order_and_content() {
    let mut rig = Rig::new(3);
    let indications: Vec<Message> = types_of(MessageKind::Indication).map(sample).collect();
    rig.ncp
        .stack_mut()
        .outgoing
        .extend(indications.iter().cloned());

    let count = indications.len();
    rig.pump_until("all indications", |rig| rig.received.borrow().len() == count);

    assert_eq!(*rig.received.borrow(), indications);
    assert_eq!(
        rig.host.bridge().reader_stats().frames,
        count as u64
    );
    rig.assert_clean("all indications");
}

#[test]
fn decoded_indication_payload_matches_the_sender() {
    let Message::Indication(Indication::VendorData(sent)) =
        sample(MessageType::VendorDataIndication)
    else {
        unreachable!()
    };
    let mut rig = Rig::new(1);
    rig.ncp.indicate(sent.clone());
    rig.pump_until("vendor data", |rig| !rig.received.borrow().is_empty());

    let received = rig.received.borrow();
    let Message::Indication(Indication::VendorData(got)) = &received[0] else {
        panic!("unexpected {:?}", received[0]);
    };
    assert_eq!(got.nsdu, b"firmware 1.2");
    assert_eq!(got, &sent);
}
