use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_POLL_MAX_FAILURES: u32 = 3;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Client configuration loaded from environment variables (and `.env`).
/// Every value has a default; command-line flags override afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub poll_max_failures: u32,
    pub http_timeout: Duration,
    pub output_dir: PathBuf,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_max_failures: DEFAULT_POLL_MAX_FAILURES,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let poll_interval_ms = parse_var::<u64>(&lookup, "GRANT_POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let poll_max_failures = parse_var::<u32>(&lookup, "GRANT_POLL_MAX_FAILURES")?
            .unwrap_or(DEFAULT_POLL_MAX_FAILURES);
        let timeout_secs = parse_var::<u64>(&lookup, "GRANT_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        if poll_interval_ms == 0 {
            anyhow::bail!("GRANT_POLL_INTERVAL_MS must be at least 1");
        }
        if poll_max_failures == 0 {
            anyhow::bail!("GRANT_POLL_MAX_FAILURES must be at least 1");
        }

        Ok(Config {
            api_url: lookup("GRANT_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_max_failures,
            http_timeout: Duration::from_secs(timeout_secs),
            output_dir: lookup("GRANT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
        })
        .transpose()
}
