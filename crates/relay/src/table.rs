use csv::{QuoteStyle, Terminator, WriterBuilder};
use loghook_core::error::{LoghookError, Result};

pub const HEADER: [&str; 4] = ["Timestamp", "Severity", "Source", "Message"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub timestamp: String,
    pub severity: String,
    pub source: String,
    pub message: String,
}

/// Renders a header row plus one row per entry. Minimal quoting, CRLF line
/// endings.
pub fn render_csv(rows: &[TableRow]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .map_err(|e| LoghookError::Internal(format!("csv header write failed: {e}")))?;
    for row in rows {
        writer
            .write_record([
                row.timestamp.as_str(),
                row.severity.as_str(),
                row.source.as_str(),
                row.message.as_str(),
            ])
            .map_err(|e| LoghookError::Internal(format!("csv row write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LoghookError::Internal(format!("csv flush failed: {}", e.error())))?;
    String::from_utf8(bytes)
        .map_err(|e| LoghookError::Internal(format!("csv output is not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(message: &str) -> TableRow {
        TableRow {
            timestamp: "2023-11-14T22:13:20".to_string(),
            severity: "ERROR".to_string(),
            source: "svc-a".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn renders_header_and_row_with_crlf() {
        let out = render_csv(&[row("disk full")]).unwrap();
        assert_eq!(
            out,
            "Timestamp,Severity,Source,Message\r\n2023-11-14T22:13:20,ERROR,svc-a,disk full\r\n"
        );
    }

    #[test]
    fn header_only_when_no_rows() {
        assert_eq!(render_csv(&[]).unwrap(), "Timestamp,Severity,Source,Message\r\n");
    }

    #[test]
    fn quotes_only_when_needed() {
        let out = render_csv(&[row(r#"a, "b""#)]).unwrap();
        assert!(out.ends_with("svc-a,\"a, \"\"b\"\"\"\r\n"));
    }

    #[test]
    fn tricky_message_survives_standard_parser() {
        let message = "failed, said \"no\"\nthen retried";
        let out = render_csv(&[row(message)]).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][3], message);
        assert_eq!(&records[0][2], "svc-a");
    }
}
