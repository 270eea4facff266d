mod telemetry;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use loghook_core::config::Config;
use loghook_core::time::{TimeWindow, TimeZoneMode, parse_time_or_relative_at};
use loghook_relay::{ConsoleSink, PayloadSink, Relay, RelaySettings};
use loghook_source::{Backend, CloudWatchSource, FileSource};

use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "loghook")]
#[command(about = "Forward matching log events to a chat webhook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Config file (default: ~/.config/loghook/config.toml)")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Fetch, format and deliver events in a time window")]
    Run {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long, help = "Webhook URL; payloads are printed when none is configured")]
        webhook_url: Option<String>,
    },
    #[command(about = "Print the payloads a run would send, without delivering")]
    Preview {
        #[command(flatten)]
        query: QueryArgs,
    },
    #[command(about = "Print the resolved configuration")]
    Config,
}

#[derive(Args, Debug, Clone, Default)]
struct QueryArgs {
    #[arg(long, help = "Window start: RFC3339 or a duration ago (e.g. 15m)")]
    since: Option<String>,
    #[arg(long, help = "Window end: RFC3339, a duration ago, or `now`")]
    until: Option<String>,
    #[arg(long, help = "Attach a CSV table of each event")]
    detail: bool,
    #[arg(
        long,
        conflicts_with = "detail",
        help = "Never attach CSV tables, even if configured"
    )]
    no_detail: bool,
    #[arg(long)]
    log_group: Option<String>,
    #[arg(long = "filter")]
    filter_pattern: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long, help = "utc or local")]
    time_zone: Option<String>,
    #[arg(long, help = "Read raw events from a JSON Lines file instead of CloudWatch")]
    events_file: Option<PathBuf>,
}

impl QueryArgs {
    fn include_detail(&self, cfg: &Config) -> bool {
        if self.no_detail {
            false
        } else {
            self.detail || cfg.include_detail
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();

    match cli.command {
        Commands::Run { query, webhook_url } => {
            let mut cfg = resolve_config(cli.config, &query)?;
            if let Some(url) = webhook_url {
                cfg.webhook_url = Some(url).filter(|u| !u.trim().is_empty());
            }
            let window = resolve_window(&query, &cfg, Utc::now())?;
            let include_detail = query.include_detail(&cfg);
            let relay = build_relay(&query, &cfg).await?;

            tracing::info!(
                log_group = %relay.settings().log_group,
                start = %window.start.to_rfc3339(),
                end = %window.end.to_rfc3339(),
                include_detail,
                "starting run"
            );
            let summary = relay
                .run(window, include_detail)
                .await
                .context("forward log events")?;
            tracing::info!(
                events = summary.events,
                destination = ?summary.destination,
                "run complete"
            );
        }
        Commands::Preview { query } => {
            let cfg = resolve_config(cli.config, &query)?;
            let window = resolve_window(&query, &cfg, Utc::now())?;
            let include_detail = query.include_detail(&cfg);
            let relay = build_relay(&query, &cfg).await?;

            let payloads = relay
                .collect(window, include_detail)
                .await
                .context("collect log events")?;
            ConsoleSink::stdout().deliver(&payloads).await?;
        }
        Commands::Config => {
            let cfg = Config::load(cli.config.as_deref()).context("load configuration")?;
            println!("{}", serde_json::to_string_pretty(&redacted(&cfg)?)?);
        }
    }

    Ok(())
}

fn resolve_config(path: Option<PathBuf>, query: &QueryArgs) -> anyhow::Result<Config> {
    let mut cfg = Config::load(path.as_deref()).context("load configuration")?;
    if let Some(v) = &query.log_group {
        cfg.log_group = Some(v.clone());
    }
    if let Some(v) = &query.filter_pattern {
        cfg.filter_pattern = Some(v.clone()).filter(|p| !p.trim().is_empty());
    }
    if let Some(v) = &query.region {
        cfg.region = Some(v.clone());
    }
    if let Some(v) = &query.time_zone {
        cfg.time_zone = TimeZoneMode::from_str(v)?;
    }
    Ok(cfg)
}

fn resolve_window(
    query: &QueryArgs,
    cfg: &Config,
    now: DateTime<Utc>,
) -> anyhow::Result<TimeWindow> {
    let end = match &query.until {
        Some(v) => parse_time_or_relative_at(v, now).context("parse --until")?,
        None => now,
    };
    let window = match &query.since {
        Some(v) => TimeWindow::new(
            parse_time_or_relative_at(v, now).context("parse --since")?,
            end,
        )?,
        None => TimeWindow::trailing(cfg.lookback, end)?,
    };
    Ok(window)
}

async fn build_relay(query: &QueryArgs, cfg: &Config) -> anyhow::Result<Relay<Backend>> {
    let backend = match &query.events_file {
        Some(path) => Backend::File(FileSource::new(path)),
        None => Backend::CloudWatch(CloudWatchSource::from_env(cfg.region.clone()).await),
    };
    let mut cfg = cfg.clone();
    if matches!(backend, Backend::File(_)) && cfg.log_group.is_none() {
        cfg.log_group = query
            .events_file
            .as_ref()
            .map(|p| p.display().to_string());
    }
    tracing::debug!(backend = backend.name(), "log source selected");
    Ok(Relay::new(backend, RelaySettings::from_config(&cfg)?))
}

fn redacted(cfg: &Config) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(cfg)?;
    if cfg.webhook_url.is_some() {
        value["webhook_url"] = serde_json::Value::String("<redacted>".to_string());
    }
    Ok(value)
}
