use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::hex::format_hex;

#[derive(Clone, Debug, Copy, ValueEnum)]
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

#[derive(Serialize)]
struct MessageOutput {
    index: usize,
    size: usize,
    hex: String,
    text: Option<String>,
}

/// Print one decoded message body. `index` is its position in arrival order.
pub fn print_message(index: usize, message: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                index,
                size: message.len(),
                hex: format_hex(message),
                text: text_preview(message),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "HEX", "TEXT"])
                .add_row(vec![
                    index.to_string(),
                    message.len().to_string(),
                    format_hex(message),
                    text_preview(message).unwrap_or_else(|| "<binary>".to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "message #{index} size={} hex={}",
                message.len(),
                format_hex(message)
            );
        }
        OutputFormat::Raw => {
            print_raw(message);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn text_preview(message: &[u8]) -> Option<String> {
    std::str::from_utf8(message)
        .ok()
        .filter(|text| text.chars().all(|c| !c.is_control() || c.is_ascii_whitespace()))
        .map(str::to_string)
}
