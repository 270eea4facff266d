use loghook_core::config::Config;
use loghook_core::error::Result;
use loghook_core::model::payload::ChatPayload;
use loghook_core::time::{TimeWindow, TimeZoneMode};
use loghook_source::{EventQuery, Fetcher, LogSource};
use serde::Serialize;

use crate::deliver::{ConsoleSink, PayloadSink, WebhookSink};
use crate::format::format_payload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub log_group: String,
    pub filter_pattern: Option<String>,
    /// `None` sends payloads to stdout instead of a webhook.
    pub webhook_url: Option<String>,
    pub time_zone: TimeZoneMode,
}

impl RelaySettings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            log_group: cfg.require_log_group()?.to_string(),
            filter_pattern: cfg.filter_pattern.clone(),
            webhook_url: cfg.webhook_url.clone(),
            time_zone: cfg.time_zone,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Webhook,
    Console,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub destination: Destination,
}

/// Fetch, format and deliver in one sequential pass.
pub struct Relay<S> {
    fetcher: Fetcher<S>,
    settings: RelaySettings,
}

impl<S: LogSource> Relay<S> {
    pub fn new(source: S, settings: RelaySettings) -> Self {
        Self {
            fetcher: Fetcher::new(source, settings.time_zone),
            settings,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Fetches the window and formats every record, in store order.
    pub async fn collect(
        &self,
        window: TimeWindow,
        include_detail: bool,
    ) -> Result<Vec<ChatPayload>> {
        let query = EventQuery {
            log_group: self.settings.log_group.clone(),
            filter_pattern: self.settings.filter_pattern.clone(),
            window,
        };
        let records = self.fetcher.fetch(&query).await?;
        records
            .iter()
            .map(|record| format_payload(record, include_detail))
            .collect()
    }

    pub async fn run(&self, window: TimeWindow, include_detail: bool) -> Result<RunSummary> {
        let payloads = self.collect(window, include_detail).await?;

        let destination = match self.settings.webhook_url.as_deref() {
            Some(url) => {
                WebhookSink::new(url)?.deliver(&payloads).await?;
                Destination::Webhook
            }
            None => {
                tracing::info!(
                    payloads = payloads.len(),
                    "no webhook configured; writing payloads to stdout"
                );
                ConsoleSink::stdout().deliver(&payloads).await?;
                Destination::Console
            }
        };

        Ok(RunSummary {
            events: payloads.len(),
            destination,
        })
    }

    /// Like [`Relay::run`] but delivers to an explicit sink.
    pub async fn run_into<D: PayloadSink>(
        &self,
        window: TimeWindow,
        include_detail: bool,
        sink: &mut D,
    ) -> Result<usize> {
        let payloads = self.collect(window, include_detail).await?;
        sink.deliver(&payloads).await?;
        Ok(payloads.len())
    }
}
