//! Retry wrapper for generation clients.
//!
//! Backs off only on rate-limit signals: wait `min(base * 2^attempt, max)`
//! between attempts, up to a fixed attempt cap. Any other failure propagates
//! immediately. The defaults (1000 ms base, 30000 ms ceiling, 3 attempts
//! total) are part of the service contract.

use super::{GenerationClient, GenerationError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use teller_common::config::GenerationConfig;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per request, initial send included.
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds (doubles with each retry).
    pub base_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Pull the retry fields out of the generation configuration.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_backoff_ms: config.base_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

/// A generation client wrapper that retries rate-limited requests with
/// exponential backoff.
pub struct RetryingClient {
    inner: Arc<dyn GenerationClient>,
    config: RetryConfig,
}

impl RetryingClient {
    /// Wrap a client with the given retry configuration.
    pub fn new(inner: Arc<dyn GenerationClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Wrap a client with the default retry configuration.
    pub fn with_defaults(inner: Arc<dyn GenerationClient>) -> Self {
        Self::new(inner, RetryConfig::default())
    }

    /// Calculate backoff delay for a given attempt.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .config
            .base_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.config.max_backoff_ms);
        Duration::from_millis(delay_ms)
    }
}

#[async_trait]
impl GenerationClient for RetryingClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_attempts {
            match self.inner.generate(prompt).await {
                Ok(text) => {
                    if attempt > 0 {
                        tracing::info!(
                            provider = self.inner.name(),
                            attempt = attempt + 1,
                            "Generation recovered after rate-limit retries"
                        );
                    }
                    return Ok(text);
                }
                Err(e) if e.is_rate_limited() => {
                    // Only sleep if there are more attempts left
                    if attempt + 1 < self.config.max_attempts {
                        let delay = self.backoff_delay(attempt);
                        tracing::warn!(
                            provider = self.inner.name(),
                            attempt = attempt + 1,
                            max_attempts = self.config.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "Rate limit hit, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| GenerationError {
            provider: self.inner.name().to_string(),
            message: "No attempts were made".to_string(),
            status_code: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock client that fails the first `fail_until` calls.
    struct MockClient {
        calls: Arc<AtomicUsize>,
        fail_until: usize,
        status_code: Option<u16>,
        response: &'static str,
    }

    impl MockClient {
        fn new(
            fail_until: usize,
            status_code: Option<u16>,
            response: &'static str,
        ) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    fail_until,
                    status_code,
                    response,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl GenerationClient for MockClient {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            if attempt <= self.fail_until {
                return Err(GenerationError {
                    provider: "mock".to_string(),
                    message: "upstream failure".to_string(),
                    status_code: self.status_code,
                });
            }

            Ok(self.response.to_string())
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let (client, calls) = MockClient::new(0, None, "success");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        let result = retrying.generate("prompt").await.unwrap();
        assert_eq!(result, "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_rate_limit_then_succeeds() {
        let (client, calls) = MockClient::new(1, Some(429), "recovered");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        let result = retrying.generate("prompt").await.unwrap();
        assert_eq!(result, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2); // 1 rate limit + 1 success
    }

    #[tokio::test]
    async fn other_errors_propagate_immediately() {
        let (client, calls) = MockClient::new(usize::MAX, Some(500), "never");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        let err = retrying.generate("prompt").await.unwrap_err();
        assert_eq!(err.status_code, Some(500));
        assert_eq!(calls.load(Ordering::SeqCst), 1); // no retry
    }

    #[tokio::test]
    async fn network_errors_propagate_immediately() {
        let (client, calls) = MockClient::new(usize::MAX, None, "never");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        retrying.generate("prompt").await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_with_expected_backoff() {
        let (client, calls) = MockClient::new(usize::MAX, Some(429), "never");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        let start = tokio::time::Instant::now();
        let err = retrying.generate("prompt").await.unwrap_err();

        // Exactly 3 sends, with 1000 ms + 2000 ms waits between them and no
        // sleep after the final failure.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn backoff_doubles_with_attempts() {
        let (client, _) = MockClient::new(0, None, "unused");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        assert_eq!(retrying.backoff_delay(0).as_millis(), 1000);
        assert_eq!(retrying.backoff_delay(1).as_millis(), 2000);
        assert_eq!(retrying.backoff_delay(2).as_millis(), 4000);
    }

    #[test]
    fn backoff_caps_at_max() {
        let (client, _) = MockClient::new(0, None, "unused");
        let retrying = RetryingClient::with_defaults(Arc::new(client));

        assert_eq!(retrying.backoff_delay(5).as_millis(), 30_000);
        assert_eq!(retrying.backoff_delay(20).as_millis(), 30_000);
    }
}
