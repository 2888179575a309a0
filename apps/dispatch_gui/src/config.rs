use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{resource_client::DEFAULT_API_BASE, RetryPolicy};
use serde::Deserialize;
use url::Url;

const CONFIG_FILE_NAME: &str = "dispatch.toml";
const CONFIG_DIR_NAME: &str = "delivery_dispatch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    /// `0` leaves the HTTP client's connect timeout unset.
    pub connect_timeout_ms: u64,
    pub max_assign_attempts: u32,
    pub assign_retry_cooldown_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            connect_timeout_ms: 5_000,
            max_assign_attempts: 5,
            assign_retry_cooldown_ms: 2_000,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_assign_attempts,
            cooldown: Duration::from_millis(self.assign_retry_cooldown_ms),
        }
    }
}

/// Keys accepted in `dispatch.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base: Option<String>,
    connect_timeout_ms: Option<u64>,
    max_assign_attempts: Option<u32>,
    assign_retry_cooldown_ms: Option<u64>,
    log_filter: Option<String>,
}

/// Explicit `--config` wins; otherwise `./dispatch.toml`, then the per-user
/// config directory. Implicit locations are only used when the file exists.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

pub fn apply_file(mut settings: Settings, raw: &str) -> anyhow::Result<Settings> {
    let file_cfg: FileSettings = toml::from_str(raw).context("invalid dispatch configuration")?;

    if let Some(v) = file_cfg.api_base {
        settings.api_base = v;
    }
    if let Some(v) = file_cfg.connect_timeout_ms {
        settings.connect_timeout_ms = v;
    }
    if let Some(v) = file_cfg.max_assign_attempts {
        settings.max_assign_attempts = v;
    }
    if let Some(v) = file_cfg.assign_retry_cooldown_ms {
        settings.assign_retry_cooldown_ms = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }

    Ok(settings)
}

/// Environment overrides. Numeric values that do not parse are ignored.
pub fn apply_env<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("DISPATCH_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = lookup("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = lookup("APP__CONNECT_TIMEOUT_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.connect_timeout_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__MAX_ASSIGN_ATTEMPTS") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.max_assign_attempts = parsed;
        }
    }
    if let Some(v) = lookup("APP__ASSIGN_RETRY_COOLDOWN_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.assign_retry_cooldown_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

/// Accepts absolute http(s) URLs only; the trailing slash is dropped.
pub fn normalize_api_base(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url must use http or https, got '{}'", parsed.scheme());
    }
    if parsed.host_str().is_none() {
        bail!("api base url '{raw}' has no host");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Defaults, then the config file, then the environment, then `--api-base`.
pub fn load_settings(
    config_path: Option<&Path>,
    api_base_override: Option<&str>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = config_file_path(config_path) {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        settings = apply_file(settings, &raw)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
    }

    settings = apply_env(settings, |key| std::env::var(key).ok());

    if let Some(api_base) = api_base_override {
        settings.api_base = api_base.to_string();
    }

    settings.api_base = normalize_api_base(&settings.api_base)?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
