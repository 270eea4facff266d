use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::FilteredLogEvent;
use loghook_core::error::{LoghookError, Result};

use crate::event::RawEvent;
use crate::source::{EventQuery, LogSource};

/// CloudWatch Logs backend built on `FilterLogEvents`.
#[derive(Clone)]
pub struct CloudWatchSource {
    client: Client,
}

impl CloudWatchSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the SDK default credential chain, optionally
    /// pinning the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

impl LogSource for CloudWatchSource {
    async fn fetch(&self, query: &EventQuery) -> Result<Vec<RawEvent>> {
        let Some((start_time, end_time)) = query_bounds(query) else {
            tracing::debug!(log_group = %query.log_group, "window holds no whole millisecond");
            return Ok(Vec::new());
        };

        let mut events = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let resp = self
                .client
                .filter_log_events()
                .log_group_name(query.log_group.clone())
                .start_time(start_time)
                .end_time(end_time)
                .set_filter_pattern(query.filter_pattern.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    LoghookError::Source(format!(
                        "FilterLogEvents on {} failed: {}",
                        query.log_group,
                        DisplayErrorContext(&e)
                    ))
                })?;
            pages += 1;

            for event in resp.events() {
                events.push(raw_from_filtered(event)?);
            }

            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(
            log_group = %query.log_group,
            pages,
            events = events.len(),
            "cloudwatch query complete"
        );
        Ok(events)
    }
}

/// Inclusive `(startTime, endTime)` for `FilterLogEvents`, or `None` when the
/// window covers no whole millisecond.
fn query_bounds(query: &EventQuery) -> Option<(i64, i64)> {
    if query.window.is_empty_millis() {
        return None;
    }
    // endTime is inclusive on the store side
    Some((query.window.start_millis(), query.window.end_millis() - 1))
}

fn raw_from_filtered(event: &FilteredLogEvent) -> Result<RawEvent> {
    let event_id = event.event_id().unwrap_or("-");
    let timestamp = event.timestamp().ok_or_else(|| {
        LoghookError::Parse(format!("event {event_id} has no timestamp"))
    })?;
    let message = event
        .message()
        .ok_or_else(|| LoghookError::Parse(format!("event {event_id} has no message")))?;
    Ok(RawEvent::new(timestamp, message))
}
