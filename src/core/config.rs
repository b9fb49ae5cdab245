use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::rsvp::rate_limit::RateLimitConfig;
use crate::rsvp::sheet::RetryPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Spreadsheet write endpoint. Required to serve, see `require_sheet_api_url`.
    pub sheet_api_url: Option<String>,
    pub upstream_timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
    pub pending_capacity: usize,
    pub static_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_api_url: None,
            upstream_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            pending_capacity: 100,
            static_dir: String::from("./web"),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for env var {}: {}", name, value)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let sheet_api_url = env::var("RSVP_SHEET_API_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let upstream_timeout = Duration::from_secs(parse_var(
            "RSVP_UPSTREAM_TIMEOUT_SECS",
            defaults.upstream_timeout.as_secs(),
        )?);
        let retry = RetryPolicy {
            max_retries: parse_var("RSVP_UPSTREAM_MAX_RETRIES", defaults.retry.max_retries)?,
            initial_backoff: Duration::from_millis(parse_var(
                "RSVP_UPSTREAM_BACKOFF_MS",
                defaults.retry.initial_backoff.as_millis() as u64,
            )?),
        };
        let rate_limit = RateLimitConfig {
            max_requests: parse_var("RSVP_RATE_LIMIT_MAX", defaults.rate_limit.max_requests)?,
            window: Duration::from_secs(parse_var(
                "RSVP_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit.window.as_secs(),
            )?),
            capacity: parse_var("RSVP_RATE_LIMIT_CAPACITY", defaults.rate_limit.capacity)?,
        };
        let pending_capacity = parse_var("RSVP_PENDING_CAPACITY", defaults.pending_capacity)?;
        let static_dir = env::var("RSVP_STATIC_DIR").unwrap_or(defaults.static_dir);

        Ok(Self {
            sheet_api_url,
            upstream_timeout,
            retry,
            rate_limit,
            pending_capacity,
            static_dir,
        })
    }

    /// The server can't do anything useful without somewhere to write
    /// RSVPs, so this is checked once at startup.
    pub fn require_sheet_api_url(&self) -> Result<&str> {
        self.sheet_api_url
            .as_deref()
            .ok_or_else(|| anyhow!("Missing env var RSVP_SHEET_API_URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_sheet_api_url() {
        let config = AppConfig::default();
        assert!(config.require_sheet_api_url().is_err());

        let config = AppConfig {
            sheet_api_url: Some("https://sheetdb.example/api/v1/abc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.require_sheet_api_url().unwrap(),
            "https://sheetdb.example/api/v1/abc"
        );
    }

    #[test]
    fn test_defaults_match_rsvp_rules() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(300));
        assert_eq!(config.retry.max_retries, 2);
    }
}
