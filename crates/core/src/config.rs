use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LoghookError, Result};
use crate::time::TimeZoneMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub log_group: Option<String>,
    pub filter_pattern: Option<String>,
    pub webhook_url: Option<String>,
    pub include_detail: bool,
    #[serde(with = "duration_str")]
    pub lookback: Duration,
    pub region: Option<String>,
    pub time_zone: TimeZoneMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_group: None,
            filter_pattern: None,
            webhook_url: None,
            include_detail: false,
            lookback: Duration::from_secs(15 * 60),
            region: None,
            time_zone: TimeZoneMode::Utc,
        }
    }
}

impl Config {
    /// Defaults, then the config file, then `LOGHOOK_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides(|key| env::var(key).ok())?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn require_log_group(&self) -> Result<&str> {
        self.log_group.as_deref().ok_or_else(|| {
            LoghookError::Config(
                "log group is not set (use --log-group, log_group or LOGHOOK_LOG_GROUP)"
                    .to_string(),
            )
        })
    }
}

mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    log_group: Option<String>,
    filter_pattern: Option<String>,
    webhook_url: Option<String>,
    include_detail: Option<bool>,
    lookback: Option<String>,
    region: Option<String>,
    time_zone: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGHOOK_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("loghook/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LoghookError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LoghookError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides<F>(lookup: F) -> Result<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let include_detail = match lookup("LOGHOOK_INCLUDE_DETAIL") {
        Some(v) => Some(parse_flag(&v).ok_or_else(|| {
            LoghookError::Config(format!(
                "bad LOGHOOK_INCLUDE_DETAIL in environment: expected a boolean, got {v}"
            ))
        })?),
        None => None,
    };

    Ok(ConfigOverrides {
        log_group: lookup("LOGHOOK_LOG_GROUP"),
        filter_pattern: lookup("LOGHOOK_FILTER_PATTERN"),
        webhook_url: lookup("LOGHOOK_WEBHOOK_URL").or_else(|| lookup("SLACK_WEBHOOK_URL")),
        include_detail,
        lookback: lookup("LOGHOOK_LOOKBACK"),
        region: lookup("LOGHOOK_REGION"),
        time_zone: lookup("LOGHOOK_TIME_ZONE"),
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn non_empty(v: String) -> Option<String> {
    if v.trim().is_empty() { None } else { Some(v) }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.log_group {
        cfg.log_group = non_empty(v);
    }
    if let Some(v) = overrides.filter_pattern {
        cfg.filter_pattern = non_empty(v);
    }
    if let Some(v) = overrides.webhook_url {
        cfg.webhook_url = non_empty(v);
    }
    if let Some(v) = overrides.include_detail {
        cfg.include_detail = v;
    }
    if let Some(v) = overrides.lookback {
        cfg.lookback = humantime::parse_duration(&v).map_err(|e| {
            LoghookError::Config(format!("bad lookback in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.region {
        cfg.region = non_empty(v);
    }
    if let Some(v) = overrides.time_zone {
        cfg.time_zone = TimeZoneMode::from_str(&v).map_err(|e| {
            LoghookError::Config(format!("bad time_zone in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}
