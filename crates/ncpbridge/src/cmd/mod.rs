use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use ncpbridge_msg::request::{
    ChannelAgilityRequest, DataRequest, GetRequest, PairRequest, ResetRequest, RxEnableRequest,
    SetRequest, StartRequest, UnpairRequest, ZrcCommandDiscoveryRequest,
};
use ncpbridge_msg::types::{dev_type_list, profile_id_list};
use ncpbridge_msg::{AgilityMode, DevType, NibAttribute, ProfileId, Request};

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
#[cfg(unix)]
pub mod send;
#[cfg(unix)]
pub mod serve;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one host request as a wire frame.
    Encode(EncodeArgs),
    /// Decode wire frames from hex.
    Decode(DecodeArgs),
    /// Run a host and an emulated NCP against each other in-process.
    Simulate(SimulateArgs),
    /// Serve an emulated NCP on a Unix domain socket.
    #[cfg(unix)]
    Serve(ServeArgs),
    /// Send one request to a serving NCP and print its confirm.
    #[cfg(unix)]
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        #[cfg(unix)]
        Command::Serve(args) => serve::run(args, format),
        #[cfg(unix)]
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Host requests the CLI can build from arguments.
#[derive(Subcommand, Debug, Clone)]
pub enum RequestCommand {
    /// NLME-RESET.request.
    Reset {
        /// Keep the current NIB instead of restoring defaults.
        #[arg(long)]
        keep_nib: bool,
    },
    /// NLME-START.request.
    Start,
    /// NLME-RX-ENABLE.request.
    RxEnable {
        /// Receiver on-time in symbols; 0 disables, 0xFFFFFF keeps it on.
        #[arg(default_value = "16777215")]
        duration: u32,
    },
    /// NLME-GET.request.
    Get {
        /// Attribute id (e.g. 0x61 or 97).
        #[arg(value_parser = parse_byte)]
        attribute: u8,
        /// Table index, for table attributes.
        #[arg(long, default_value = "0", value_parser = parse_byte)]
        index: u8,
    },
    /// NLME-SET.request.
    Set {
        /// Attribute id (e.g. 0x61 or 97).
        #[arg(value_parser = parse_byte)]
        attribute: u8,
        /// Value bytes as hex, little-endian.
        value: String,
        /// Table index, for table attributes.
        #[arg(long, default_value = "0", value_parser = parse_byte)]
        index: u8,
    },
    /// NLME-PAIR.request.
    Pair {
        /// Logical channel of the recipient.
        #[arg(long, default_value = "15")]
        channel: u8,
        /// PAN id of the recipient.
        #[arg(long, default_value = "65535")]
        pan_id: u16,
        /// IEEE address of the recipient.
        #[arg(long, default_value = "0")]
        ieee: u64,
    },
    /// NLME-UNPAIR.request.
    Unpair {
        #[arg(value_parser = parse_byte)]
        pairing_ref: u8,
    },
    /// NWK-CH-AGILITY.request.
    ChannelAgility {
        #[arg(value_enum)]
        mode: AgilityArg,
    },
    /// ZRC-CMD-DISCOVERY.request.
    CommandDiscovery {
        #[arg(value_parser = parse_byte)]
        pairing_ref: u8,
    },
    /// NLDE-DATA.request.
    Data {
        #[arg(value_parser = parse_byte)]
        pairing_ref: u8,
        /// Payload as hex.
        payload: String,
        #[arg(long, default_value = "1", value_parser = parse_byte)]
        profile: u8,
        #[arg(long, default_value = "65521")]
        vendor: u16,
        /// Transmit option bits.
        #[arg(long, default_value = "0x04", value_parser = parse_byte)]
        tx_options: u8,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgilityArg {
    OneShot,
    Periodic,
    Stop,
}

impl From<AgilityArg> for AgilityMode {
    fn from(mode: AgilityArg) -> Self {
        match mode {
            AgilityArg::OneShot => AgilityMode::ONE_SHOT,
            AgilityArg::Periodic => AgilityMode::PERIODIC,
            AgilityArg::Stop => AgilityMode::STOP,
        }
    }
}

impl RequestCommand {
    pub fn to_request(&self) -> CliResult<Request> {
        let request = match self {
            Self::Reset { keep_nib } => ResetRequest {
                set_default_nib: !keep_nib,
            }
            .into(),
            Self::Start => StartRequest {}.into(),
            Self::RxEnable { duration } => RxEnableRequest {
                rx_on_duration: *duration,
            }
            .into(),
            Self::Get { attribute, index } => GetRequest {
                attribute: NibAttribute(*attribute),
                index: *index,
            }
            .into(),
            Self::Set {
                attribute,
                value,
                index,
            } => SetRequest {
                attribute: NibAttribute(*attribute),
                index: *index,
                value: parse_hex(value)?,
            }
            .into(),
            Self::Pair {
                channel,
                pan_id,
                ieee,
            } => PairRequest {
                logical_channel: *channel,
                dst_pan_id: *pan_id,
                dst_ieee_addr: *ieee,
                org_app_capabilities: 0x01,
                org_dev_types: dev_type_list(DevType::REMOTE_CONTROL),
                org_profiles: profile_id_list(ProfileId::ZRC),
                key_ex_transfer_count: 36,
            }
            .into(),
            Self::Unpair { pairing_ref } => UnpairRequest {
                pairing_ref: *pairing_ref,
            }
            .into(),
            Self::ChannelAgility { mode } => ChannelAgilityRequest {
                mode: (*mode).into(),
            }
            .into(),
            Self::CommandDiscovery { pairing_ref } => ZrcCommandDiscoveryRequest {
                pairing_ref: *pairing_ref,
            }
            .into(),
            Self::Data {
                pairing_ref,
                payload,
                profile,
                vendor,
                tx_options,
            } => DataRequest {
                pairing_ref: *pairing_ref,
                profile_id: ProfileId(*profile),
                vendor_id: *vendor,
                tx_options: *tx_options,
                nsdu: parse_hex(payload)?,
            }
            .into(),
        };
        Ok(request)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(subcommand)]
    pub request: RequestCommand,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex; whitespace is ignored.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw frame bytes from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Largest read the host side sees per call.
    #[arg(long, default_value = "7")]
    pub host_read: usize,
    /// Largest write the host side completes per call.
    #[arg(long, default_value = "5")]
    pub host_write: usize,
    /// Largest read the NCP side sees per call.
    #[arg(long, default_value = "3")]
    pub ncp_read: usize,
    /// Largest write the NCP side completes per call.
    #[arg(long, default_value = "4")]
    pub ncp_write: usize,
    /// Give up after this many polling cycles.
    #[arg(long, default_value = "10000")]
    pub cycles: usize,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after the first session ends.
    #[arg(long)]
    pub once: bool,
    /// Echo data requests back as data indications.
    #[arg(long)]
    pub loopback: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Maximum time to wait for the confirm (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    #[command(subcommand)]
    pub request: RequestCommand,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `0x`-prefixed hex or decimal into a byte.
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("not a byte value: {input}"))
}

/// Decode hex, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.split_whitespace().collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    hex::decode(cleaned).map_err(|err| CliError::usage(format!("invalid hex: {err}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
