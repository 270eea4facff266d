use std::path::{Path, PathBuf};

use loghook_core::error::{LoghookError, Result};

use crate::event::RawEvent;
use crate::source::{EventQuery, LogSource};

/// Replays raw events from a JSON Lines file, one `{"timestamp", "message"}`
/// object per line.
///
/// The log group is ignored. A filter pattern is split on whitespace and every
/// term must appear in the event body.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSource for FileSource {
    async fn fetch(&self, query: &EventQuery) -> Result<Vec<RawEvent>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LoghookError::Io(format!("failed reading {}: {e}", self.path.display()))
        })?;
        let events = parse_lines(&raw, &self.path)?;
        Ok(events
            .into_iter()
            .filter(|event| query.window.contains_millis(event.timestamp))
            .filter(|event| matches_pattern(query.filter_pattern.as_deref(), &event.message))
            .collect())
    }
}

fn parse_lines(raw: &str, path: &Path) -> Result<Vec<RawEvent>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<RawEvent>(line).map_err(|e| {
                LoghookError::Parse(format!("{}:{}: {e}", path.display(), idx + 1))
            })
        })
        .collect()
}

fn matches_pattern(pattern: Option<&str>, body: &str) -> bool {
    match pattern {
        None => true,
        Some(pattern) => pattern.split_whitespace().all(|term| body.contains(term)),
    }
}
