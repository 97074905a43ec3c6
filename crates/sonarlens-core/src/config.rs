use std::time::Duration;

use crate::error::{Result, SonarError};

const ENV_COOKIE: &str = "SONARLENS_COOKIE";
const ENV_THROTTLE_MS: &str = "SONARLENS_THROTTLE_MS";
const ENV_TIMEOUT_MS: &str = "SONARLENS_TIMEOUT_MS";

const DEFAULT_THROTTLE_MS: u64 = 150;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for one metrics server.
///
/// Credentials are a pre-existing session cookie string; no login flow is
/// performed. The throttle interval separates every enrichment request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub cookie: Option<String>,
    pub timeout: Duration,
    pub throttle: Duration,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            cookie: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
        }
    }

    /// Reads cookie and timing overrides from the `SONARLENS_*` environment.
    pub fn from_env(base_url: &str) -> Result<Self> {
        let cookie = std::env::var(ENV_COOKIE)
            .ok()
            .filter(|s| !s.trim().is_empty());
        let throttle_ms = parse_millis(
            ENV_THROTTLE_MS,
            std::env::var(ENV_THROTTLE_MS).ok().as_deref(),
            DEFAULT_THROTTLE_MS,
        )?;
        let timeout_ms = parse_millis(
            ENV_TIMEOUT_MS,
            std::env::var(ENV_TIMEOUT_MS).ok().as_deref(),
            DEFAULT_TIMEOUT_MS,
        )?;

        Ok(Self {
            base_url: normalize_base_url(base_url),
            cookie,
            timeout: Duration::from_millis(timeout_ms),
            throttle: Duration::from_millis(throttle_ms),
        })
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }
}

fn parse_millis(name: &str, raw: Option<&str>, default: u64) -> Result<u64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            SonarError::Validation(format!(
                "invalid {name}: {value} (expected milliseconds as a non-negative integer)"
            ))
        }),
    }
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
