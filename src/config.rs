use std::time::Duration;

use crate::gate::DEFAULT_CONFIRM_TIMEOUT;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Slack slash-command verification token. Unset rejects every trigger.
    pub slack_token: Option<String>,
    /// Token the gate controller sends in `X-API-Token`. Unset rejects every confirmation.
    pub api_token: Option<String>,
    /// How long a trigger waits for confirmation before reporting failure.
    /// Set via GATE_CONFIRM_TIMEOUT_SECS. Default: 5.
    pub confirm_timeout: Duration,
    /// Request timeout for replies posted to Slack.
    /// Set via GATE_NOTIFY_TIMEOUT_SECS. Default: 10.
    pub notify_timeout: Duration,
    /// Emit JSON log lines (LOG_FORMAT=json).
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            slack_token: None,
            api_token: None,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
            log_json: false,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    Ok(from_lookup(|key| std::env::var(key).ok()))
}

/// Builds a config from an arbitrary variable source. Unparseable numbers
/// fall back to their defaults; empty tokens count as unset.
pub fn from_lookup<F>(lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let secret = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let secs = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

    Config {
        port: lookup("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT),
        slack_token: secret("SLACK_TOKEN"),
        api_token: secret("API_TOKEN"),
        confirm_timeout: secs("GATE_CONFIRM_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONFIRM_TIMEOUT),
        notify_timeout: Duration::from_secs(
            secs("GATE_NOTIFY_TIMEOUT_SECS").unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
        ),
        log_json: lookup("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false),
    }
}
