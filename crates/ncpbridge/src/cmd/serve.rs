use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ncpbridge::stack::EmulatedStack;
use ncpbridge_peer::Ncp;
use ncpbridge_transport::{StreamLink, UnixDomainSocket};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::ServeArgs;
use crate::exit::{bridge_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_json, OutputFormat};

const IDLE_SLEEP: Duration = Duration::from_millis(1);

#[derive(Debug, Serialize)]
struct SessionSummary {
    session: u64,
    requests: u64,
    dropped_frames: u64,
    dropped_messages: u64,
    pairings: usize,
}

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let socket = UnixDomainSocket::bind(&args.path)
        .map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut session = 0u64;
    while running.load(Ordering::SeqCst) {
        let link = match socket.try_accept() {
            Ok(Some(link)) => link,
            Ok(None) => {
                thread::sleep(IDLE_SLEEP);
                continue;
            }
            Err(err) => return Err(transport_error("accept failed", err)),
        };

        session += 1;
        info!(session, "host connected");
        let summary = serve_session(session, link, args.loopback, &running)?;
        info!(session, requests = summary.requests, "host disconnected");
        if matches!(format, OutputFormat::Json) {
            print_json(&summary);
        } else {
            println!(
                "session {}: {} requests, {} dropped frames, {} dropped messages",
                summary.session, summary.requests, summary.dropped_frames, summary.dropped_messages
            );
        }

        if args.once {
            break;
        }
    }

    Ok(SUCCESS)
}

fn serve_session(
    session: u64,
    link: StreamLink<UnixStream>,
    loopback: bool,
    running: &AtomicBool,
) -> CliResult<SessionSummary> {
    let stack = EmulatedStack::default().with_loopback(loopback);
    let mut ncp = Ncp::new(link, stack).map_err(|err| bridge_error("ncp setup failed", err))?;

    while running.load(Ordering::SeqCst) {
        match ncp.task() {
            Ok(report) if report.is_idle() => thread::sleep(IDLE_SLEEP),
            Ok(_) => {}
            Err(err) if err.is_link_closed() => break,
            Err(err) => {
                warn!(session, %err, "session failed");
                return Err(bridge_error("serve failed", err));
            }
        }
    }

    Ok(SessionSummary {
        session,
        requests: ncp.stack().handled(),
        dropped_frames: ncp.dropped_frames(),
        dropped_messages: ncp.dropped_messages(),
        pairings: ncp.stack().pairings().len(),
    })
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
