//! Retry-on-rate-limit policy for generation calls.

use crate::config::PipelineSettings;
use crate::llm::LlmError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retries rate-limited calls after a fixed cooldown.
///
/// Any other failure is returned on the first attempt, unchanged.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    cooldown: Duration,
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(cooldown: Duration, max_retries: u32) -> Self {
        Self {
            cooldown,
            max_retries,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.rate_limit_cooldown_secs),
            settings.max_retries,
        )
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `call`, retrying it while it fails with a rate limit and retries remain.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        "Rate limited ({}), retrying in {:?} ({}/{})",
                        e, self.cooldown, retries, self.max_retries
                    );
                    tokio::time::sleep(self.cooldown).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 1)
    }
}
