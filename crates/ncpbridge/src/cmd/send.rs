use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use ncpbridge_msg::{Confirm, Message};
use ncpbridge_peer::{confirm_handler, Host};
use ncpbridge_transport::{SerialLink, UnixDomainSocket};
use tracing::debug;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{bridge_error, transport_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT};
use crate::output::{print_records, MessageRecord, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let request = args.request.to_request()?;

    let link = UnixDomainSocket::connect(&args.path)
        .map_err(|err| transport_error("connect failed", err))?;
    let mut host = Host::new(link).map_err(|err| bridge_error("host setup failed", err))?;

    let slot: Rc<RefCell<Option<Confirm>>> = Rc::new(RefCell::new(None));
    let handler = {
        let slot = Rc::clone(&slot);
        confirm_handler(move |confirm, _| {
            slot.borrow_mut().replace(confirm);
        })
    };
    debug!(message = request.message_type().name(), "sending request");
    host.request(request, Some(handler))
        .map_err(|err| bridge_error("send failed", err))?;

    let confirm = wait_for_confirm(&mut host, &slot, timeout)?;
    let status = confirm.status();
    print_records(&[MessageRecord::new("ncp", Message::Confirm(confirm))], format);

    Ok(if status.is_success() { SUCCESS } else { FAILURE })
}

fn wait_for_confirm<L: SerialLink>(
    host: &mut Host<L>,
    slot: &RefCell<Option<Confirm>>,
    timeout: Duration,
) -> CliResult<Confirm> {
    let deadline = Instant::now() + timeout;
    loop {
        let report = host
            .task()
            .map_err(|err| bridge_error("receive failed", err))?;
        if let Some(confirm) = slot.borrow_mut().take() {
            return Ok(confirm);
        }
        if Instant::now() >= deadline {
            return Err(CliError::new(
                TIMEOUT,
                format!("no confirm within {}ms", timeout.as_millis()),
            ));
        }
        if report.is_idle() {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
