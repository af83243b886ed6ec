use ncpbridge_frame::{DEFAULT_MAX_FRAME, DEFAULT_TX_SLOTS, PROTOCOL_ID_RF4CONTROL};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ncpbridge {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ncpbridge");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("NCPBRIDGE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("protocol_id: 0x{PROTOCOL_ID_RF4CONTROL:02x}");
    println!("max_frame_len: {DEFAULT_MAX_FRAME}");
    println!("tx_slots: {DEFAULT_TX_SLOTS}");
    println!("features: peer={}, cli=true", cfg!(feature = "peer"));

    Ok(SUCCESS)
}
