use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One structured log line pulled out of the log store.
///
/// `timestamp` is the store-assigned event time, already shifted into the
/// zone the fetcher was configured with. Nothing downstream converts it again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    pub message: String,
    pub severity: String,
    pub source: String,
    pub timestamp: NaiveDateTime,
}
