use std::future::Future;

use loghook_core::error::Result;
use loghook_core::model::record::LogRecord;
use loghook_core::time::{TimeWindow, TimeZoneMode};

use crate::event::{RawEvent, parse_event};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub log_group: String,
    /// Store-interpreted filter expression. `None` matches every event.
    pub filter_pattern: Option<String>,
    pub window: TimeWindow,
}

/// Read-only query capability over a log store.
pub trait LogSource {
    fn fetch(&self, query: &EventQuery) -> impl Future<Output = Result<Vec<RawEvent>>> + Send;
}

/// Queries a [`LogSource`] and parses every returned event.
///
/// Parsing is fail-fast: the first malformed event aborts the fetch and no
/// records are returned.
pub struct Fetcher<S> {
    source: S,
    time_zone: TimeZoneMode,
}

impl<S: LogSource> Fetcher<S> {
    pub fn new(source: S, time_zone: TimeZoneMode) -> Self {
        Self { source, time_zone }
    }

    pub async fn fetch(&self, query: &EventQuery) -> Result<Vec<LogRecord>> {
        let raw = self.source.fetch(query).await?;
        tracing::debug!(
            log_group = %query.log_group,
            events = raw.len(),
            "fetched raw events"
        );
        raw.iter()
            .map(|event| parse_event(event, self.time_zone))
            .collect()
    }
}
