use chrono::{NaiveDateTime, Timelike};
use loghook_core::error::Result;
use loghook_core::model::payload::{
    Attachment, AttachmentField, Block, ChatPayload, Color, TextObject,
};
use loghook_core::model::record::LogRecord;

use crate::table::{TableRow, render_csv};

pub const DETAIL_FALLBACK: &str = "CSV of error logs";

pub fn display_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// ISO-8601 without offset; microseconds are printed only when non-zero.
pub fn iso_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

pub fn severity_color(severity: &str) -> Color {
    if severity == "ERROR" {
        Color::Danger
    } else {
        Color::Warning
    }
}

fn normalize_detail_message(message: &str) -> String {
    message.trim().replace('\n', " ")
}

/// Maps one record to a chat payload. With `include_detail` the payload
/// carries a single attachment holding a one-row CSV table of the record.
pub fn format_payload(record: &LogRecord, include_detail: bool) -> Result<ChatPayload> {
    let pretty = display_timestamp(&record.timestamp);
    let block = Block::Section {
        text: TextObject::mrkdwn(format!(
            "*{}* - {}\n{}\n{}",
            record.severity, record.source, pretty, record.message
        )),
        color: severity_color(&record.severity),
    };

    let attachments = if include_detail {
        vec![detail_attachment(record)?]
    } else {
        Vec::new()
    };

    Ok(ChatPayload {
        text: format!("{pretty}\n{}", record.message),
        blocks: vec![block],
        attachments,
    })
}

fn detail_attachment(record: &LogRecord) -> Result<Attachment> {
    let iso = iso_timestamp(&record.timestamp);
    let message = normalize_detail_message(&record.message);
    let table = render_csv(&[TableRow {
        timestamp: iso.clone(),
        severity: record.severity.clone(),
        source: record.source.clone(),
        message: message.clone(),
    }])?;

    Ok(Attachment {
        fallback: DETAIL_FALLBACK.to_string(),
        text: table,
        fields: vec![
            AttachmentField::new("Timestamp", iso),
            AttachmentField::new("Severity", record.severity.clone()),
            AttachmentField::new("Source", record.source.clone()),
            AttachmentField::new("Message", message),
        ],
    })
}
