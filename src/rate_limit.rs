//! Server-reported rate limit handling.
//!
//! The upstream API declares its quota state in response headers. When the
//! remaining quota hits zero we pause until the advertised reset time instead
//! of burning attempts on guaranteed 403s. This reacts to what the server
//! reports; it keeps no local accounting.

use reqwest::header::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Header names carrying the quota state. Provider-specific, so configurable;
/// defaults match the GitHub REST API.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub remaining_header: String,
    pub reset_header: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            remaining_header: "x-ratelimit-remaining".to_string(),
            reset_header: "x-ratelimit-reset".to_string(),
        }
    }
}

/// Inspects responses for quota exhaustion and pauses until the reset epoch.
#[derive(Debug, Clone, Default)]
pub struct RateLimitGuard {
    config: RateLimitConfig,
}

impl RateLimitGuard {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    /// How long to pause given the response headers, or `None` when requests
    /// may continue. Missing or malformed headers parse as zero, which yields
    /// a reset in the past and therefore no pause.
    pub fn required_pause(&self, headers: &HeaderMap, now_epoch: u64) -> Option<Duration> {
        let remaining = header_as_u64(headers, &self.config.remaining_header);
        if remaining > 0 {
            return None;
        }

        let reset_epoch = header_as_u64(headers, &self.config.reset_header);
        let wait = reset_epoch.checked_sub(now_epoch)?;
        if wait == 0 {
            return None;
        }

        // One extra second so we land past the reset, not on it.
        Some(Duration::from_secs(wait + 1))
    }

    /// Blocking check invoked after each upstream response: sleeps through the
    /// quota window when the server says we are out of requests.
    pub async fn pause_if_exhausted(&self, headers: &HeaderMap) {
        if let Some(wait) = self.required_pause(headers, epoch_now()) {
            warn!(
                "Quota exhausted, pausing {}s until the reported reset",
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
        }
    }
}

fn header_as_u64(headers: &HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
