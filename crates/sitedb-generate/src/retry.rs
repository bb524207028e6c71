use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, info, warn};

use sitedb_core::config::GenerationSettings;
use sitedb_core::error::{Error, Result};
use sitedb_core::traits::{GenerationRequest, Generator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Bound on a single attempt; an attempt that runs over counts as failed.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self { max_retries: 2, attempt_timeout: None } }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self { Self { max_retries, attempt_timeout: None } }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self::new(settings.max_retries).with_attempt_timeout(settings.attempt_timeout())
    }

    pub fn max_attempts(&self) -> u32 { self.max_retries.saturating_add(1) }
}

/// Delay after failed attempt `attempt` (0-based): `2^attempt + jitter` seconds,
/// jitter clamped to [0, 1]. The exponent stops growing at 16, past the
/// retry cap that settings validation enforces.
pub fn backoff(attempt: u32, jitter: f64) -> Duration {
    let base = 2f64.powi(attempt.min(16) as i32);
    Duration::from_secs_f64(base + jitter.clamp(0.0, 1.0))
}

/// Calls `generator` until it succeeds or the policy's attempts run out,
/// sleeping with exponential backoff and jitter between attempts. The last
/// failure is returned as [`Error::Generation`].
pub async fn invoke_with_retry(
    generator: &dyn Generator,
    request: &GenerationRequest,
    policy: &RetryPolicy,
) -> Result<String> {
    let attempts = policy.max_attempts();
    let mut last_error = String::new();
    for attempt in 0..attempts {
        let outcome = match policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, generator.generate(request)).await {
                Ok(result) => result.map_err(|e| format!("{e:#}")),
                Err(_) => Err(Error::Timeout(limit).to_string()),
            },
            None => generator.generate(request).await.map_err(|e| format!("{e:#}")),
        };
        match outcome {
            Ok(text) => {
                if attempt > 0 { info!(attempt = attempt + 1, "generation succeeded after retry"); }
                return Ok(text);
            }
            Err(message) => {
                warn!(attempt = attempt + 1, max_attempts = attempts, error = %message, "generation attempt failed");
                last_error = message;
                if attempt + 1 < attempts {
                    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
                    let delay = backoff(attempt, jitter);
                    debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    error!(attempts, error = %last_error, "generation failed");
    Err(Error::Generation { attempts, message: last_error })
}
