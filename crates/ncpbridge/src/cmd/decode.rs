use std::io::Read;

use ncpbridge_frame::{Frame, FrameReader, ReaderStats};
use ncpbridge_msg::Message;
use serde::Serialize;
use tracing::warn;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, print_records, MessageRecord, OutputFormat};

#[derive(Debug, Serialize)]
struct Rejected {
    code: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    frames: u64,
    skipped_bytes: u64,
    null_frames: u64,
    oversized: u64,
    bad_end: u64,
    foreign: u64,
    empty: u64,
}

impl From<ReaderStats> for StatsOutput {
    fn from(stats: ReaderStats) -> Self {
        Self {
            frames: stats.frames,
            skipped_bytes: stats.skipped_bytes,
            null_frames: stats.null_frames,
            oversized: stats.oversized,
            bad_end: stats.bad_end,
            foreign: stats.foreign,
            empty: stats.empty,
        }
    }
}

#[derive(Debug, Serialize)]
struct DecodeOutput {
    messages: Vec<MessageRecord>,
    rejected: Vec<Rejected>,
    stats: StatsOutput,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = read_input(&args)?;
    let output = decode_stream(&bytes);

    match format {
        OutputFormat::Json => print_json(&output),
        _ => {
            print_records(&output.messages, format);
            for rejected in &output.rejected {
                eprintln!("rejected {}: {}", rejected.code, rejected.error);
            }
        }
    }

    if output.messages.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "no decodable frames in {} bytes ({} skipped)",
                bytes.len(),
                output.stats.skipped_bytes
            ),
        ));
    }
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.hex {
        return parse_hex(text);
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading stdin", err))?;
    parse_hex(&text)
}

fn decode_stream(mut bytes: &[u8]) -> DecodeOutput {
    let mut reader = FrameReader::new();
    let mut messages = Vec::new();
    let mut rejected = Vec::new();

    while !bytes.is_empty() {
        let (used, frame) = reader.push(bytes);
        bytes = &bytes[used..];
        let Some(frame) = frame else {
            continue;
        };
        match decode_frame(&frame) {
            Ok(message) => messages.push(MessageRecord::new("wire", message)),
            Err(err) => {
                warn!(message_type = frame.message_type, %err, "frame not decodable");
                rejected.push(Rejected {
                    code: format!("0x{:02x}", frame.message_type),
                    error: err.to_string(),
                });
            }
        }
    }

    DecodeOutput {
        messages,
        rejected,
        stats: reader.stats().into(),
    }
}

fn decode_frame(frame: &Frame) -> ncpbridge_msg::Result<Message> {
    Message::decode(frame.message_type, &frame.payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_back_to_back_frames_after_garbage() {
        let bytes = [
            0xAA, 0x55, // noise
            0x01, 0x03, 0x01, 0x18, 0x00, 0x04, // reset confirm
            0x01, 0x02, 0x01, 0x1D, 0x04, // truncated unpair indication
            0x01, 0x03, 0x01, 0x1D, 0x02, 0x04, // unpair indication
        ];
        let output = decode_stream(&bytes);
        assert_eq!(output.messages.len(), 2);
        assert_eq!(output.messages[0].name, "NLME_RESET_CONFIRM");
        assert_eq!(output.messages[1].name, "NLME_UNPAIR_INDICATION");
        assert_eq!(output.rejected.len(), 1);
        assert_eq!(output.rejected[0].code, "0x1d");
        assert_eq!(output.stats.frames, 3);
        assert_eq!(output.stats.skipped_bytes, 2);
    }

    #[test]
    fn unknown_type_is_rejected_not_fatal() {
        let output = decode_stream(&[0x01, 0x02, 0x01, 0x2A, 0x04]);
        assert!(output.messages.is_empty());
        assert_eq!(output.rejected.len(), 1);
    }
}
