//! Fault-tolerant HTTP GET with bounded retry and exponential backoff.
//!
//! The retry decision is kept in [`RetrySchedule`], a pure state machine over
//! the attempt index and the failure class, so the backoff policy is testable
//! without a network in the loop. [`ResilientClient`] drives it: issue the
//! request, classify the outcome, sleep whatever the schedule says, repeat.

use crate::rate_limit::{RateLimitConfig, RateLimitGuard};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// How a failed attempt is treated by the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 403: usually quota exhaustion surfacing as forbidden. Retried at the
    /// current delay without doubling; the quota pause already happened.
    QuotaForbidden,
    /// 429: explicit throttle. Retried, delay doubles.
    Throttled,
    /// 5xx. Retried, delay doubles.
    ServerError,
    /// Connection/timeout errors below the HTTP layer. Retried at the
    /// current delay without doubling.
    Transport,
}

/// Bounds and initial delay for the retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
        }
    }
}

/// Mutable retry state: which attempt just failed and what the next pause is.
#[derive(Debug)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    attempt: u32,
    delay: Duration,
}

impl RetrySchedule {
    pub fn new(policy: RetryPolicy) -> Self {
        let delay = policy.base_delay;
        Self {
            policy,
            attempt: 0,
            delay,
        }
    }

    /// Register a failed attempt. Returns how long to sleep before the next
    /// one, or `None` once the attempt budget is spent.
    pub fn next_delay(&mut self, class: FailureClass) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.policy.max_attempts {
            return None;
        }

        match class {
            FailureClass::QuotaForbidden | FailureClass::Transport => Some(self.delay),
            FailureClass::Throttled | FailureClass::ServerError => {
                let current = self.delay;
                self.delay = current.saturating_mul(2);
                Some(current)
            }
        }
    }
}

/// HTTP client wrapping GETs in the retry schedule and the rate-limit guard.
pub struct ResilientClient {
    http: Client,
    policy: RetryPolicy,
    limiter: RateLimitGuard,
}

impl ResilientClient {
    /// Build a client carrying the bearer token (when present) and a
    /// User-Agent on every request, as the upstream API requires.
    pub fn new(token: Option<&str>, policy: RetryPolicy, limits: RateLimitConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("user-aggregator"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("Invalid bearer token value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            policy,
            limiter: RateLimitGuard::new(limits),
        })
    }

    /// GET `url`, retrying transient failures per the schedule. `None` means
    /// the resource could not be fetched; callers skip it and move on.
    pub async fn fetch(&self, url: &str) -> Option<Response> {
        let mut schedule = RetrySchedule::new(self.policy.clone());

        loop {
            let class = match self.http.get(url).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    self.limiter.pause_if_exhausted(resp.headers()).await;
                    return Some(resp);
                }
                Ok(resp) if resp.status() == StatusCode::FORBIDDEN => {
                    warn!("403 from {url}, checking quota before retrying");
                    self.limiter.pause_if_exhausted(resp.headers()).await;
                    FailureClass::QuotaForbidden
                }
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    warn!("429 from {url}, backing off");
                    FailureClass::Throttled
                }
                Ok(resp) if resp.status().is_server_error() => {
                    warn!("{} from {url}, backing off", resp.status());
                    FailureClass::ServerError
                }
                Ok(resp) => {
                    warn!("Unexpected status {} from {url}, giving up", resp.status());
                    return None;
                }
                Err(e) => {
                    warn!("Request to {url} failed: {e}");
                    FailureClass::Transport
                }
            };

            match schedule.next_delay(class) {
                Some(delay) => {
                    debug!("Retrying {url} in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!("Exhausted retries for {url}");
                    return None;
                }
            }
        }
    }
}
