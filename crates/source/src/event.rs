use loghook_core::error::{LoghookError, Result};
use loghook_core::model::record::LogRecord;
use loghook_core::time::TimeZoneMode;
use serde::{Deserialize, Serialize};

/// Event as returned by the log store: epoch-millisecond timestamp plus the
/// JSON-encoded body the application logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEvent {
    pub timestamp: i64,
    pub message: String,
}

impl RawEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventBody {
    severity: String,
    logger: LoggerField,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoggerField {
    name: String,
}

/// Parses one raw event into a record. The record time is always the store
/// timestamp; any time embedded in the body is ignored.
pub fn parse_event(raw: &RawEvent, zone: TimeZoneMode) -> Result<LogRecord> {
    let body: EventBody = serde_json::from_str(&raw.message).map_err(|e| {
        LoghookError::Parse(format!(
            "event at {} has an invalid body: {e}",
            raw.timestamp
        ))
    })?;
    let timestamp = zone.naive_from_millis(raw.timestamp)?;

    Ok(LogRecord {
        message: body.message,
        severity: body.severity,
        source: body.logger.name,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const DISK_FULL: &str =
        r#"{"severity":"ERROR","logger":{"name":"svc-a"},"message":"disk full"}"#;

    #[test]
    fn parses_well_formed_event() {
        let raw = RawEvent::new(1_700_000_000_000, DISK_FULL);
        let record = parse_event(&raw, TimeZoneMode::Utc).unwrap();
        assert_eq!(record.severity, "ERROR");
        assert_eq!(record.source, "svc-a");
        assert_eq!(record.message, "disk full");
        assert_eq!(
            record.timestamp,
            NaiveDate::from_ymd_opt(2023, 11, 14)
                .unwrap()
                .and_hms_opt(22, 13, 20)
                .unwrap()
        );
    }

    #[test]
    fn store_timestamp_wins_over_body_timestamp() {
        let raw = RawEvent::new(
            1_700_000_000_000,
            r#"{"severity":"INFO","logger":{"name":"svc"},"message":"m","timestamp":"1999-01-01T00:00:00"}"#,
        );
        let record = parse_event(&raw, TimeZoneMode::Utc).unwrap();
        assert_eq!(record.timestamp.to_string(), "2023-11-14 22:13:20");
    }

    #[test]
    fn rejects_non_json_body() {
        let err = parse_event(&RawEvent::new(0, "not json"), TimeZoneMode::Utc).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn rejects_missing_fields() {
        let cases = [
            r#"{"logger":{"name":"svc"},"message":"m"}"#,
            r#"{"severity":"WARN","message":"m"}"#,
            r#"{"severity":"WARN","logger":{},"message":"m"}"#,
            r#"{"severity":"WARN","logger":{"name":"svc"}}"#,
        ];
        for body in cases {
            let err = parse_event(&RawEvent::new(0, body), TimeZoneMode::Utc).unwrap_err();
            assert!(err.is_parse(), "expected parse error for {body}");
        }
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        let err = parse_event(&RawEvent::new(i64::MAX, DISK_FULL), TimeZoneMode::Utc).unwrap_err();
        assert!(err.is_parse());
    }
}
