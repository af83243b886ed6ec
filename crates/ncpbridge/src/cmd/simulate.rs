use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ncpbridge::stack::EmulatedStack;
use ncpbridge_msg::request::{
    DataRequest, GetRequest, PairRequest, ResetRequest, StartRequest, UnpairRequest,
};
use ncpbridge_msg::types::{dev_type_list, profile_id_list, tx_options};
use ncpbridge_msg::{DevType, Message, NibAttribute, ProfileId, Request};
use ncpbridge_peer::{confirm_handler, Host, IndicationCallbacks, Ncp};
use ncpbridge_transport::{LinkProfile, MemoryLink};
use tracing::{debug, info};

use crate::cmd::SimulateArgs;
use crate::exit::{bridge_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_records, MessageRecord, OutputFormat};

type Events = Rc<RefCell<Vec<MessageRecord>>>;

/// Cycles both sides must stay idle before the run counts as settled.
const SETTLE_CYCLES: usize = 8;

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    if [args.host_read, args.host_write, args.ncp_read, args.ncp_write].contains(&0) {
        return Err(CliError::new(USAGE, "chunk sizes must be greater than zero"));
    }

    let (host_link, ncp_link) = MemoryLink::pair_with(
        LinkProfile::chunked(args.host_read, args.host_write),
        LinkProfile::chunked(args.ncp_read, args.ncp_write),
    );
    let mut host = Host::new(host_link).map_err(|err| bridge_error("host setup failed", err))?;
    let mut ncp = Ncp::new(ncp_link, EmulatedStack::default().with_loopback(true))
        .map_err(|err| bridge_error("ncp setup failed", err))?;

    let events: Events = Rc::new(RefCell::new(Vec::new()));
    host.register_indications(indication_recorder(&events));

    let mut cycles = 0usize;
    for request in script() {
        events
            .borrow_mut()
            .push(MessageRecord::new("host", Message::Request(request.clone())));

        let done = Rc::new(Cell::new(false));
        let handler = {
            let events = Rc::clone(&events);
            let done = Rc::clone(&done);
            confirm_handler(move |confirm, _| {
                events
                    .borrow_mut()
                    .push(MessageRecord::new("ncp", Message::Confirm(confirm)));
                done.set(true);
            })
        };
        host.request(request, Some(handler))
            .map_err(|err| bridge_error("request failed", err))?;

        while !done.get() {
            if cycles >= args.cycles {
                return Err(CliError::new(
                    TIMEOUT,
                    format!("no confirm after {cycles} polling cycles"),
                ));
            }
            step(&mut host, &mut ncp)?;
            cycles += 1;
        }
    }

    // Let trailing indications through.
    let mut idle = 0usize;
    while idle < SETTLE_CYCLES && cycles < args.cycles {
        idle = if step(&mut host, &mut ncp)? { idle + 1 } else { 0 };
        cycles += 1;
    }

    info!(
        cycles,
        host_dropped = host.dropped(),
        ncp_dropped_frames = ncp.dropped_frames(),
        ncp_dropped_messages = ncp.dropped_messages(),
        "simulation finished"
    );
    print_records(&events.borrow(), format);
    Ok(SUCCESS)
}

/// One cycle of each side. Returns whether both were idle.
fn step(host: &mut Host<MemoryLink>, ncp: &mut Ncp<MemoryLink, EmulatedStack>) -> CliResult<bool> {
    let host_report = host
        .task()
        .map_err(|err| bridge_error("host task failed", err))?;
    let ncp_report = ncp
        .task()
        .map_err(|err| bridge_error("ncp task failed", err))?;
    debug!(host = ?host_report, ncp = ?ncp_report, "cycle");
    Ok(host_report.is_idle() && ncp_report.is_idle() && ncp.stack().backlog() == 0)
}

fn indication_recorder(events: &Events) -> IndicationCallbacks {
    let data = Rc::clone(events);
    let comm = Rc::clone(events);
    let unpair = Rc::clone(events);
    IndicationCallbacks::new()
        .on_data(move |ind, _| {
            data.borrow_mut()
                .push(MessageRecord::new("ncp", Message::Indication(ind.into())));
        })
        .on_comm_status(move |ind, _| {
            comm.borrow_mut()
                .push(MessageRecord::new("ncp", Message::Indication(ind.into())));
        })
        .on_unpair(move |ind, _| {
            unpair
                .borrow_mut()
                .push(MessageRecord::new("ncp", Message::Indication(ind.into())));
        })
}

/// Bring the node up, pair, exchange data and tear the pairing down.
fn script() -> Vec<Request> {
    vec![
        ResetRequest {
            set_default_nib: true,
        }
        .into(),
        StartRequest {}.into(),
        GetRequest {
            attribute: NibAttribute::BASE_CHANNEL,
            index: 0,
        }
        .into(),
        PairRequest {
            logical_channel: 15,
            dst_pan_id: 0x1234,
            dst_ieee_addr: 0x0011_2233_4455_6677,
            org_app_capabilities: 0x01,
            org_dev_types: dev_type_list(DevType::REMOTE_CONTROL),
            org_profiles: profile_id_list(ProfileId::ZRC),
            key_ex_transfer_count: 36,
        }
        .into(),
        DataRequest {
            pairing_ref: 0,
            profile_id: ProfileId::ZRC,
            vendor_id: 0xFFF1,
            tx_options: tx_options::ACK_REQ,
            nsdu: b"hello".to_vec(),
        }
        .into(),
        UnpairRequest { pairing_ref: 0 }.into(),
    ]
}
