//! Host and emulated NCP in one process, joined by a link that delivers
//! bytes a few at a time.
//!
//! Run with:
//!   cargo run --example host-ncp-loopback

use std::cell::RefCell;
use std::rc::Rc;

use ncpbridge::msg::request::{DataRequest, PairRequest, ResetRequest, StartRequest};
use ncpbridge::msg::ProfileId;
use ncpbridge::peer::{Host, IndicationCallbacks, Ncp};
use ncpbridge::stack::EmulatedStack;
use ncpbridge::transport::{LinkProfile, MemoryLink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (host_link, ncp_link) =
        MemoryLink::pair_with(LinkProfile::chunked(4, 3), LinkProfile::chunked(2, 5));
    let mut host = Host::new(host_link)?;
    let mut ncp = Ncp::new(ncp_link, EmulatedStack::default().with_loopback(true))?;

    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let data_log = Rc::clone(&log);
    host.register_indications(IndicationCallbacks::new().on_data(move |ind, _| {
        data_log.borrow_mut().push(format!(
            "data indication on pairing {}: {:?}",
            ind.pairing_ref,
            String::from_utf8_lossy(&ind.nsdu)
        ));
    }));

    // The start request goes out from inside the reset confirm handler.
    let reset_log = Rc::clone(&log);
    host.reset_request(
        ResetRequest {
            set_default_nib: true,
        },
        move |confirm, requests| {
            reset_log
                .borrow_mut()
                .push(format!("reset: {}", confirm.status));
            let start_log = Rc::clone(&reset_log);
            let queued = requests.start_request(StartRequest {}, move |confirm, _| {
                start_log
                    .borrow_mut()
                    .push(format!("start: {}", confirm.status))
            });
            if let Err(err) = queued {
                reset_log.borrow_mut().push(format!("start not sent: {err}"));
            }
        },
    )?;
    run_until(&mut host, &mut ncp, &log, 2)?;

    let pair_log = Rc::clone(&log);
    host.pair_request(PairRequest::default(), move |confirm, _| {
        pair_log.borrow_mut().push(format!(
            "pair: {} ref={} target={:?}",
            confirm.status, confirm.pairing_ref, confirm.rec_user_string
        ))
    })?;
    run_until(&mut host, &mut ncp, &log, 3)?;

    let data_log = Rc::clone(&log);
    host.data_request(
        DataRequest {
            pairing_ref: 0,
            profile_id: ProfileId::ZRC,
            nsdu: b"volume up".to_vec(),
            ..Default::default()
        },
        move |confirm, _| data_log.borrow_mut().push(format!("data: {}", confirm.status)),
    )?;
    run_until(&mut host, &mut ncp, &log, 5)?;

    for line in log.borrow().iter() {
        println!("{line}");
    }
    Ok(())
}

/// Poll both sides until `count` events have been logged.
fn run_until(
    host: &mut Host<MemoryLink>,
    ncp: &mut Ncp<MemoryLink, EmulatedStack>,
    log: &Rc<RefCell<Vec<String>>>,
    count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..10_000 {
        if log.borrow().len() >= count {
            return Ok(());
        }
        host.task()?;
        ncp.task()?;
    }
    Err(format!("gave up waiting for event {count}").into())
}
