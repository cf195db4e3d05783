//! Resilient AI Provider - bounded retry with randomized exponential backoff.
//!
//! Wraps another provider. Each attempt runs under its own deadline; a
//! transient failure is followed by a random wait drawn uniformly from
//! `[0, min(max_backoff, multiplier * 2^(attempt - 1))]`. Fatal failures
//! return immediately. When the attempt budget is spent the last error is
//! wrapped in `AIError::RetriesExhausted`.
//!
//! # Example
//!
//! ```ignore
//! let provider = ResilientAIProvider::new(GeminiProvider::new(config)?, RetryPolicy::default());
//! ```

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::AiConfig;
use crate::ports::{AIError, AIProvider, GenerationRequest, GenerationResponse, ProviderInfo};

/// Retry schedule for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    pub max_attempts: u32,
    /// Base of the exponential ceiling.
    pub multiplier: Duration,
    /// No single wait exceeds this.
    pub max_backoff: Duration,
    /// Deadline for each individual attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            multiplier: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            multiplier: Duration::from_millis(config.backoff_multiplier_ms),
            max_backoff: Duration::from_millis(config.backoff_max_ms),
            attempt_timeout: config.attempt_timeout(),
        }
    }

    /// Upper bound of the wait that follows failed attempt `attempt` (1-based).
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.multiplier
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Random wait after failed attempt `attempt`.
    pub fn jittered_backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt).as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Provider wrapper adding per-attempt deadlines and bounded retries.
#[derive(Debug, Clone)]
pub struct ResilientAIProvider<P: AIProvider> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: AIProvider> ResilientAIProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn attempt(&self, request: GenerationRequest) -> Result<GenerationResponse, AIError> {
        match timeout(self.policy.attempt_timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(AIError::Timeout {
                timeout_secs: self.policy.attempt_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl<P: AIProvider> AIProvider for ResilientAIProvider<P> {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AIError> {
        let max_attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.attempt(request.clone()).await {
                Ok(response) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "model call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::error!(attempt, error = %error, "model call failed with a fatal error");
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::error!(attempts = attempt, error = %error, "model call retries exhausted");
                return Err(AIError::retries_exhausted(attempt, error));
            }

            let wait = self.policy.jittered_backoff(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "transient model failure, retrying"
            );
            sleep(wait).await;
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use proptest::prelude::*;
    use tokio::time::Instant;

    fn request() -> GenerationRequest {
        GenerationRequest::new("system")
    }

    fn resilient(mock: MockAIProvider) -> ResilientAIProvider<MockAIProvider> {
        ResilientAIProvider::new(mock, RetryPolicy::default())
    }

    mod schedule {
        use super::*;

        #[test]
        fn ceiling_doubles_until_capped() {
            let policy = RetryPolicy::default();
            assert_eq!(policy.backoff_ceiling(1), Duration::from_secs(1));
            assert_eq!(policy.backoff_ceiling(2), Duration::from_secs(2));
            assert_eq!(policy.backoff_ceiling(3), Duration::from_secs(4));
            assert_eq!(policy.backoff_ceiling(4), Duration::from_secs(8));
            assert_eq!(policy.backoff_ceiling(5), Duration::from_secs(10));
            assert_eq!(policy.backoff_ceiling(60), Duration::from_secs(10));
        }

        #[test]
        fn zero_attempts_still_calls_once() {
            let policy = RetryPolicy {
                max_attempts: 0,
                ..RetryPolicy::default()
            };
            assert_eq!(policy.attempts(), 1);
        }

        proptest! {
            #[test]
            fn jitter_never_exceeds_ceiling(attempt in 1u32..64, max_secs in 1u64..30) {
                let policy = RetryPolicy {
                    max_backoff: Duration::from_secs(max_secs),
                    ..RetryPolicy::default()
                };
                let wait = policy.jittered_backoff(attempt);
                prop_assert!(wait <= policy.backoff_ceiling(attempt));
                prop_assert!(wait <= Duration::from_secs(max_secs));
            }
        }
    }

    mod retries {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn persistent_transient_failure_makes_exactly_five_attempts() {
            let mock = MockAIProvider::new().failing_with(AIError::unavailable("overloaded"));
            let provider = resilient(mock.clone());
            let started = Instant::now();

            let err = provider.generate(request()).await.unwrap_err();

            assert_eq!(mock.call_count(), 5);
            assert_eq!(
                err,
                AIError::retries_exhausted(5, AIError::unavailable("overloaded"))
            );
            // Four waits bounded by 1 + 2 + 4 + 8 seconds.
            assert!(started.elapsed() <= Duration::from_secs(15));
        }

        #[tokio::test(start_paused = true)]
        async fn recovers_after_transient_failures() {
            let mock = MockAIProvider::new()
                .with_error(AIError::rate_limited(None))
                .with_error(AIError::network("reset"))
                .with_response("Bonjour docteur.");
            let provider = resilient(mock.clone());

            let response = provider.generate(request()).await.unwrap();

            assert_eq!(response.text, "Bonjour docteur.");
            assert_eq!(mock.call_count(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn fatal_failure_is_not_retried() {
            let mock = MockAIProvider::new().failing_with(AIError::AuthenticationFailed);
            let provider = resilient(mock.clone());

            let err = provider.generate(request()).await.unwrap_err();

            assert_eq!(err, AIError::AuthenticationFailed);
            assert_eq!(mock.call_count(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn slow_attempts_time_out_and_count_as_transient() {
            let mock = MockAIProvider::new().with_delay(Duration::from_secs(120));
            let policy = RetryPolicy {
                attempt_timeout: Duration::from_secs(2),
                ..RetryPolicy::default()
            };
            let provider = ResilientAIProvider::new(mock.clone(), policy);

            let err = provider.generate(request()).await.unwrap_err();

            assert_eq!(mock.call_count(), 5);
            assert_eq!(
                err,
                AIError::retries_exhausted(5, AIError::Timeout { timeout_secs: 2 })
            );
        }

        #[tokio::test(start_paused = true)]
        async fn first_success_makes_one_call() {
            let mock = MockAIProvider::new().with_response("ok");
            let provider = resilient(mock.clone());

            assert!(provider.generate(request()).await.is_ok());
            assert_eq!(mock.call_count(), 1);
        }
    }
}
