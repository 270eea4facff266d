use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LoghookError, Result};

pub fn parse_time_or_relative(input: &str) -> Result<DateTime<Utc>> {
    parse_time_or_relative_at(input, Utc::now())
}

pub fn parse_time_or_relative_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(duration) = humantime::parse_duration(input) {
        return Ok(now
            - chrono::Duration::from_std(duration).map_err(|e| {
                LoghookError::Parse(format!("failed to parse duration to chrono: {e}"))
            })?);
    }

    Err(LoghookError::Parse(format!(
        "expected RFC3339 time, duration or `now`, got {input}"
    )))
}

/// Half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(LoghookError::InvalidArgument(format!(
                "window start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn trailing(lookback: Duration, now: DateTime<Utc>) -> Result<Self> {
        let lookback = chrono::Duration::from_std(lookback)
            .map_err(|e| LoghookError::InvalidArgument(format!("lookback out of range: {e}")))?;
        Self::new(now - lookback, now)
    }

    /// First whole millisecond at or after `start`.
    pub fn start_millis(&self) -> i64 {
        ceil_millis(&self.start)
    }

    /// First whole millisecond at or after `end`, exclusive.
    pub fn end_millis(&self) -> i64 {
        ceil_millis(&self.end)
    }

    /// True when no whole millisecond falls inside the window.
    pub fn is_empty_millis(&self) -> bool {
        self.start_millis() >= self.end_millis()
    }

    pub fn contains_millis(&self, ts_ms: i64) -> bool {
        ts_ms >= self.start_millis() && ts_ms < self.end_millis()
    }
}

fn ceil_millis(ts: &DateTime<Utc>) -> i64 {
    let ms = ts.timestamp_millis();
    if ts.timestamp_subsec_nanos() % 1_000_000 == 0 {
        ms
    } else {
        ms + 1
    }
}

/// Zone used when turning store epoch timestamps into naive record times.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Utc,
    Local,
}

impl FromStr for TimeZoneMode {
    type Err = LoghookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoghookError::Parse(format!("unknown time zone mode: {s}"))),
        }
    }
}

impl TimeZoneMode {
    pub fn naive_from_millis(self, ts_ms: i64) -> Result<NaiveDateTime> {
        let out_of_range = || LoghookError::Parse(format!("timestamp out of range: {ts_ms}"));
        match self {
            Self::Utc => DateTime::from_timestamp_millis(ts_ms)
                .map(|ts| ts.naive_utc())
                .ok_or_else(out_of_range),
            Self::Local => Local
                .timestamp_millis_opt(ts_ms)
                .earliest()
                .map(|ts| ts.naive_local())
                .ok_or_else(out_of_range),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::*;

    #[test]
    fn parses_rfc3339() {
        let ts = parse_time_or_relative("2026-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn parses_duration_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let ts = parse_time_or_relative_at("5m", now).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 2, 1, 11, 55, 0).unwrap());
        assert_eq!(parse_time_or_relative_at("now", now).unwrap(), now);
    }

    #[test]
    fn rejects_invalid() {
        assert!(parse_time_or_relative("nope").is_err());
    }

    #[test]
    fn window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2023, 11, 14, 22, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 11, 14, 23, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();
        assert!(window.contains_millis(start.timestamp_millis()));
        assert!(!window.contains_millis(end.timestamp_millis()));
        assert!(window.contains_millis(end.timestamp_millis() - 1));
    }

    #[test]
    fn sub_millisecond_bounds_round_up() {
        let start = Utc.timestamp_opt(1_700_000_000, 500_000).unwrap();
        let end = Utc.timestamp_opt(1_700_000_001, 500_000).unwrap();
        let window = TimeWindow::new(start, end).unwrap();

        assert_eq!(window.start_millis(), 1_700_000_000_001);
        assert_eq!(window.end_millis(), 1_700_000_001_001);
        assert!(!window.contains_millis(1_700_000_000_000));
        assert!(window.contains_millis(1_700_000_000_001));
        assert!(window.contains_millis(1_700_000_001_000));
        assert!(!window.contains_millis(1_700_000_001_001));
        assert!(!window.is_empty_millis());
    }

    #[test]
    fn window_inside_one_millisecond_is_empty() {
        let start = Utc.timestamp_opt(1_700_000_000, 100_000).unwrap();
        let end = Utc.timestamp_opt(1_700_000_000, 900_000).unwrap();
        let window = TimeWindow::new(start, end).unwrap();

        assert!(window.is_empty_millis());
        assert!(!window.contains_millis(1_700_000_000_000));
        assert!(!window.contains_millis(1_700_000_000_001));
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        let ts = Utc.with_ymd_and_hms(2023, 11, 14, 22, 0, 0).unwrap();
        let err = TimeWindow::new(ts, ts).unwrap_err();
        assert!(matches!(err, LoghookError::InvalidArgument(_)));
    }

    #[test]
    fn trailing_window_ends_now() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 15, 0).unwrap();
        let window = TimeWindow::trailing(Duration::from_secs(900), now).unwrap();
        assert_eq!(window.end, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn utc_conversion_keeps_millis() {
        let ts = TimeZoneMode::Utc.naive_from_millis(1_700_000_000_250).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 11, 14)
            .unwrap()
            .and_hms_milli_opt(22, 13, 20, 250)
            .unwrap();
        assert_eq!(ts, expected);
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn time_zone_mode_parse() {
        assert_eq!(TimeZoneMode::from_str("UTC").unwrap(), TimeZoneMode::Utc);
        assert_eq!(TimeZoneMode::from_str("local").unwrap(), TimeZoneMode::Local);
        assert!(TimeZoneMode::from_str("mars").is_err());
    }
}
