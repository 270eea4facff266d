use std::future::Future;
use std::io::{Stdout, Write};

use loghook_core::error::{LoghookError, Result};
use loghook_core::model::payload::ChatPayload;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};

/// Destination for a batch of formatted payloads.
pub trait PayloadSink {
    fn deliver(&mut self, payloads: &[ChatPayload]) -> impl Future<Output = Result<()>> + Send;
}

/// Posts each payload to an incoming-webhook URL, one request per payload.
///
/// Only `200 OK` counts as success. The first failure stops the batch.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: Url,
}

impl WebhookSink {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| LoghookError::Config(format!("invalid webhook url: {e}")))?;
        Ok(Self { client, url })
    }
}

impl PayloadSink for WebhookSink {
    async fn deliver(&mut self, payloads: &[ChatPayload]) -> Result<()> {
        for (idx, payload) in payloads.iter().enumerate() {
            let resp = self
                .client
                .post(self.url.clone())
                .header(CONTENT_TYPE, "application/json")
                .json(payload)
                .send()
                .await
                .map_err(|e| {
                    LoghookError::Delivery(format!("payload {idx}: webhook request failed: {e}"))
                })?;

            let status = resp.status();
            if status != StatusCode::OK {
                let body = error_body(idx, resp.text().await);
                tracing::warn!(payload = idx, status = %status, "webhook rejected payload");
                return Err(LoghookError::Delivery(format!(
                    "payload {idx}: webhook returned {status}: {body}"
                )));
            }
        }

        tracing::info!(payloads = payloads.len(), "delivered payloads to webhook");
        Ok(())
    }
}

/// First 200 characters of a rejected response body, or empty when the body
/// could not be read.
fn error_body<E: std::fmt::Display>(
    idx: usize,
    body: std::result::Result<String, E>,
) -> String {
    match body {
        Ok(body) => body.chars().take(200).collect(),
        Err(e) => {
            tracing::debug!(payload = idx, error = %e, "failed reading webhook error body");
            String::new()
        }
    }
}

/// Writes the whole batch as a pretty JSON array.
pub struct ConsoleSink<W> {
    writer: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_batch(&mut self, payloads: &[ChatPayload]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, payloads)
            .map_err(|e| LoghookError::Io(format!("failed writing payloads: {e}")))?;
        writeln!(self.writer)
            .and_then(|_| self.writer.flush())
            .map_err(|e| LoghookError::Io(format!("failed writing payloads: {e}")))
    }
}

impl<W: Write + Send> PayloadSink for ConsoleSink<W> {
    async fn deliver(&mut self, payloads: &[ChatPayload]) -> Result<()> {
        self.write_batch(payloads)
    }
}
