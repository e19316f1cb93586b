//! Retry decorator for generation service calls.
//!
//! Every external call in the pipeline goes through [`ResilientClient`],
//! which retries transport/service failures with linear backoff and
//! propagates everything else untouched. Factored as a single wrapper so
//! no call site carries its own retry loop.

use crate::client::{GenerationClient, GenerationRequest, GenerationResponse};
use dossier_core::{AppError, AppResult, RetrySettings};
use std::sync::Arc;
use std::time::Duration;

/// Retry parameters for a resilient client.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    pub max_attempts: u32,

    /// Attempt N waits N × base_delay before the next try
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }
}

/// Decorator that adds bounded retries with linear backoff to any
/// [`GenerationClient`].
///
/// Only `ServiceUnavailable` errors are retried; `MalformedResponse` is a
/// caller-level concern and passes through on the first occurrence. After
/// the final attempt the last failure propagates as `ServiceUnavailable`.
/// Backoff sleeps suspend only the calling task.
pub struct ResilientClient {
    inner: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
}

impl ResilientClient {
    /// Wrap a client with the given retry policy.
    pub fn new(inner: Arc<dyn GenerationClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl GenerationClient for ResilientClient {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        let max_attempts = self.policy.max_attempts.max(1);

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            match self.inner.generate(request).await {
                Ok(response) => return Ok(response),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    tracing::error!(
                        attempt,
                        error = %err,
                        "Generation call failed after all retries"
                    );
                    return Err(AppError::ServiceUnavailable(err.to_string()));
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        error = %err,
                        "Generation call failed, retrying"
                    );
                    tokio::time::sleep(self.policy.base_delay * attempt).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockClient;
    use tokio::time::Instant;

    fn policy(max_attempts: u32, base_delay: Duration) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_three_attempts_with_increasing_delay() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_unavailable("down 1");
        mock.enqueue_unavailable("down 2");
        mock.enqueue_unavailable("down 3");

        let client = ResilientClient::new(mock.clone(), RetryPolicy::default());
        let request = GenerationRequest::new("q", "m");

        let start = Instant::now();
        let err = client.generate(&request).await.unwrap_err();

        assert!(matches!(err, AppError::ServiceUnavailable(_)));
        assert_eq!(mock.call_count(), 3);
        // Linear backoff: 1s after the first failure, 2s after the second
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failure() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_unavailable("blip");
        mock.enqueue_text("recovered");

        let client = ResilientClient::new(mock.clone(), RetryPolicy::default());
        let request = GenerationRequest::new("q", "m");

        let response = client.generate(&request).await.unwrap();
        assert_eq!(response.content, "recovered");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("ok");

        let client = ResilientClient::new(mock.clone(), RetryPolicy::default());
        let request = GenerationRequest::new("q", "m");

        client.generate(&request).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        struct MalformedOnce;

        #[async_trait::async_trait]
        impl GenerationClient for MalformedOnce {
            fn provider_name(&self) -> &str {
                "malformed"
            }

            async fn generate(
                &self,
                _request: &GenerationRequest,
            ) -> AppResult<GenerationResponse> {
                Err(AppError::MalformedResponse("not json".to_string()))
            }
        }

        let client = ResilientClient::new(
            Arc::new(MalformedOnce),
            policy(3, Duration::from_millis(1)),
        );
        let request = GenerationRequest::new("q", "m");

        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = RetrySettings {
            max_attempts: 5,
            base_delay_ms: 250,
        };
        let policy = RetryPolicy::from(&settings);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }
}
