use bytes::BytesMut;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ncpbridge_frame::{encode_frame, DEFAULT_MAX_FRAME, PROTOCOL_ID_RF4CONTROL};
use ncpbridge_msg::Request;
use serde::Serialize;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, msg_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, OutputFormat};

#[derive(Serialize)]
struct EncodedFrame<'a> {
    name: &'static str,
    code: String,
    size: usize,
    frame: String,
    request: &'a Request,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = args.request.to_request()?;
    let frame = encode_request(&request)?;

    match format {
        OutputFormat::Json => print_json(&EncodedFrame {
            name: request.message_type().name(),
            code: format!("0x{:02x}", request.message_type().as_u8()),
            size: frame.len(),
            frame: hex::encode(&frame),
            request: &request,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "SIZE", "FRAME"])
                .add_row(vec![
                    request.message_type().name().to_string(),
                    frame.len().to_string(),
                    hex::encode(&frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(&frame)),
        OutputFormat::Raw => print_raw(&frame),
    }
    Ok(SUCCESS)
}

pub(crate) fn encode_request(request: &Request) -> CliResult<Vec<u8>> {
    request
        .check()
        .map_err(|err| msg_error("request rejected", err))?;

    let mut payload = BytesMut::new();
    request.encode_payload(&mut payload);

    let mut frame = BytesMut::new();
    encode_frame(
        PROTOCOL_ID_RF4CONTROL,
        request.message_type().as_u8(),
        &payload,
        DEFAULT_MAX_FRAME,
        &mut frame,
    )
    .map_err(|err| frame_error("encode failed", err))?;
    Ok(frame.to_vec())
}
