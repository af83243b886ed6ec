use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ncpbridge_msg::{Message, MessageKind};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One message as the CLI reports it.
#[derive(Debug, Serialize)]
pub struct MessageRecord {
    /// Where the message was seen: `host`, `ncp` or `wire`.
    pub source: &'static str,
    pub code: String,
    pub name: &'static str,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub message: Message,
}

impl MessageRecord {
    pub fn new(source: &'static str, message: Message) -> Self {
        let message_type = message.message_type();
        let status = match &message {
            Message::Confirm(confirm) => Some(confirm.status().to_string()),
            _ => None,
        };
        Self {
            source,
            code: format!("0x{:02x}", message_type.as_u8()),
            name: message_type.name(),
            kind: message_type.kind(),
            status,
            message,
        }
    }

    /// Message fields as compact JSON, without the enum tags.
    fn fields(&self) -> String {
        let value = serde_json::to_value(&self.message).unwrap_or_default();
        let mut body = value.get("body").cloned().unwrap_or_default();
        if let Some(map) = body.as_object_mut() {
            map.remove("message");
        }
        body.to_string()
    }
}

pub fn print_records(records: &[MessageRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SOURCE", "CODE", "MESSAGE", "STATUS", "FIELDS"]);
            for record in records {
                table.add_row(vec![
                    record.source.to_string(),
                    record.code.clone(),
                    record.name.to_string(),
                    record.status.clone().unwrap_or_default(),
                    record.fields(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for record in records {
                println!(
                    "{:<5} {} {}{} {}",
                    record.source,
                    record.code,
                    record.name,
                    record
                        .status
                        .as_deref()
                        .map(|s| format!(" status={s}"))
                        .unwrap_or_default(),
                    record.fields()
                );
            }
        }
        OutputFormat::Raw => {
            for record in records {
                println!("{}", record.fields());
            }
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
