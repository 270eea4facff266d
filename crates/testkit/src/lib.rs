use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use loghook_core::error::Result;
use loghook_source::{EventQuery, LogSource, RawEvent};

/// JSON body in the shape the application logger emits.
pub fn event_body(severity: &str, source: &str, message: &str) -> String {
    serde_json::json!({
        "severity": severity,
        "logger": {"name": source},
        "message": message,
    })
    .to_string()
}

pub fn raw_event(timestamp: i64, body: &str) -> RawEvent {
    RawEvent::new(timestamp, body)
}

/// `disk full` from `svc-a` at 2023-11-14 22:13:20 UTC.
pub fn error_event() -> RawEvent {
    raw_event(1_700_000_000_000, &event_body("ERROR", "svc-a", "disk full"))
}

pub fn sample_events() -> Vec<RawEvent> {
    vec![
        error_event(),
        raw_event(
            1_700_000_060_000,
            &event_body("WARN", "svc-b", "retrying attempt=2"),
        ),
        raw_event(
            1_700_000_120_500,
            &event_body("ERROR", "svc-a", "upstream said \"no\", giving up\nafter 3 tries"),
        ),
    ]
}

/// Writes events as JSON Lines, the format the file backend reads.
pub fn write_events_file(path: &Path, events: &[RawEvent]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    for event in events {
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

/// In-memory log source returning the same events for every query and
/// remembering the queries it saw. Clones share the query log.
#[derive(Clone, Default)]
pub struct StaticSource {
    events: Vec<RawEvent>,
    queries: Arc<Mutex<Vec<EventQuery>>>,
}

impl StaticSource {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl LogSource for StaticSource {
    async fn fetch(&self, query: &EventQuery) -> Result<Vec<RawEvent>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        Ok(self.events.clone())
    }
}
