//! Retry policy and resilient invocation
//!
//! A reasoning-service call fails in one of three classes (see [`ServiceError`]):
//!
//! - rate limited: wait `rate_limit_backoff_secs`, then retry
//! - quota exceeded: wait `quota_cooldown_secs` (hours), then retry
//! - anything else: fatal, returned immediately
//!
//! Both retryable classes share one attempt budget (`max_attempts`). Waiting goes
//! through a [`Sleeper`] so tests can record waits instead of sleeping.
//!
//! # Examples
//!
//! ```
//! use statsift_llm::{MockService, RecordingSleeper, ResilientInvoker, RetryPolicy};
//! use statsift_domain::{AiMessage, ServiceError};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = MockService::new();
//! service.push_error(ServiceError::RateLimited("slow down".into()));
//! service.push_response(AiMessage::text("done"));
//!
//! let sleeper = RecordingSleeper::new();
//! let invoker = ResilientInvoker::new(Arc::new(service), sleeper.clone(), RetryPolicy::default());
//! let reply = invoker.invoke(&[], &[]).await.unwrap();
//! assert_eq!(reply.content, "done");
//! assert_eq!(sleeper.sleep_count(), 1);
//! # }
//! ```

use crate::error::InvokeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use statsift_domain::{AiMessage, CapabilitySchema, Message, ReasoningService, ServiceError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Default attempt budget shared by both retryable failure classes
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20_000;

/// Default wait after a rate-limit failure (seconds)
pub const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 10;

/// Default wait after a quota failure (5 hours)
pub const DEFAULT_QUOTA_COOLDOWN_SECS: u64 = 5 * 60 * 60;

/// How long to wait per failure class, and how often to try
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first
    pub max_attempts: u32,

    /// Wait after a rate-limit failure
    pub rate_limit_backoff_secs: u64,

    /// Wait after an auth/quota failure
    pub quota_cooldown_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_backoff_secs: DEFAULT_RATE_LIMIT_BACKOFF_SECS,
            quota_cooldown_secs: DEFAULT_QUOTA_COOLDOWN_SECS,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before retrying after `error`, or `None` if the error is fatal
    pub fn backoff_for(&self, error: &ServiceError) -> Option<Duration> {
        match error {
            ServiceError::RateLimited(_) => Some(Duration::from_secs(self.rate_limit_backoff_secs)),
            ServiceError::QuotaExceeded(_) => Some(Duration::from_secs(self.quota_cooldown_secs)),
            ServiceError::Other(_) => None,
        }
    }
}

/// Clock abstraction for retry waits
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records requested waits and returns immediately
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of waits requested so far
    pub fn sleep_count(&self) -> usize {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sum of all requested waits
    pub fn total(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

/// Wraps a reasoning service with the retry policy
pub struct ResilientInvoker<S: ?Sized, Z> {
    service: Arc<S>,
    sleeper: Z,
    policy: RetryPolicy,
}

impl<S, Z> ResilientInvoker<S, Z>
where
    S: ReasoningService + ?Sized,
    Z: Sleeper,
{
    /// Create an invoker
    pub fn new(service: Arc<S>, sleeper: Z, policy: RetryPolicy) -> Self {
        Self {
            service,
            sleeper,
            policy,
        }
    }

    /// The wrapped service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the conversation and return the next AI message.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Fatal`] on the first unclassified failure
    /// - [`InvokeError::ExhaustedRetries`] once `max_attempts` attempts have failed
    pub async fn invoke(
        &self,
        messages: &[Message],
        capabilities: &[CapabilitySchema],
    ) -> Result<AiMessage, InvokeError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let error = match self.service.respond(messages, capabilities).await {
                Ok(message) => {
                    if attempts > 1 {
                        debug!(attempts, "Reasoning service recovered");
                    }
                    return Ok(message);
                }
                Err(error) => error,
            };

            let Some(wait) = self.policy.backoff_for(&error) else {
                warn!(error = %error, "Reasoning service failed");
                return Err(InvokeError::Fatal(error));
            };

            if attempts >= self.policy.max_attempts {
                warn!(attempts, class = error.class(), "Retry budget exhausted");
                return Err(InvokeError::ExhaustedRetries {
                    attempts,
                    last: error,
                });
            }

            warn!(
                class = error.class(),
                attempt = attempts,
                wait_secs = wait.as_secs(),
                "Reasoning service unavailable, retrying"
            );
            self.sleeper.sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockService;

    fn invoker(
        service: &MockService,
        sleeper: &RecordingSleeper,
        policy: RetryPolicy,
    ) -> ResilientInvoker<MockService, RecordingSleeper> {
        ResilientInvoker::new(Arc::new(service.clone()), sleeper.clone(), policy)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 20_000);
        assert_eq!(
            policy.backoff_for(&ServiceError::RateLimited(String::new())),
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            policy.backoff_for(&ServiceError::QuotaExceeded(String::new())),
            Some(Duration::from_secs(18_000))
        );
        assert_eq!(policy.backoff_for(&ServiceError::Other(String::new())), None);
    }

    #[test]
    fn test_policy_partial_config() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 3}"#).unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.rate_limit_backoff_secs, DEFAULT_RATE_LIMIT_BACKOFF_SECS);
    }

    #[tokio::test]
    async fn test_three_rate_limits_then_success() {
        let service = MockService::new();
        for _ in 0..3 {
            service.push_error(ServiceError::RateLimited("429".into()));
        }
        service.push_response(AiMessage::text("ok"));
        let sleeper = RecordingSleeper::new();

        let reply = invoker(&service, &sleeper, RetryPolicy::default())
            .invoke(&[], &[])
            .await
            .unwrap();

        assert_eq!(reply.content, "ok");
        assert_eq!(service.call_count(), 4);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(10); 3]);
    }

    #[tokio::test]
    async fn test_quota_cooldown() {
        let service = MockService::new();
        service.push_error(ServiceError::QuotaExceeded("401".into()));
        service.push_error(ServiceError::RateLimited("429".into()));
        service.push_response(AiMessage::text("ok"));
        let sleeper = RecordingSleeper::new();

        invoker(&service, &sleeper, RetryPolicy::default())
            .invoke(&[], &[])
            .await
            .unwrap();

        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_secs(18_000), Duration::from_secs(10)]
        );
        assert_eq!(sleeper.total(), Duration::from_secs(18_010));
    }

    #[tokio::test]
    async fn test_exhausted_retries() {
        let service = MockService::new();
        for _ in 0..5 {
            service.push_error(ServiceError::RateLimited("429".into()));
        }
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };

        let err = invoker(&service, &sleeper, policy)
            .invoke(&[], &[])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            InvokeError::ExhaustedRetries {
                attempts: 3,
                last: ServiceError::RateLimited("429".into())
            }
        );
        assert_eq!(service.call_count(), 3);
        // no wait after the final attempt
        assert_eq!(sleeper.sleep_count(), 2);
    }

    #[tokio::test]
    async fn test_both_classes_share_budget() {
        let service = MockService::new();
        service.push_error(ServiceError::QuotaExceeded("401".into()));
        service.push_error(ServiceError::RateLimited("429".into()));
        service.push_response(AiMessage::text("never reached"));
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::default()
        };

        let err = invoker(&service, &sleeper, policy)
            .invoke(&[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::ExhaustedRetries { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_other_error_is_fatal() {
        let service = MockService::new();
        service.push_error(ServiceError::Other("bad request".into()));
        service.push_response(AiMessage::text("never reached"));
        let sleeper = RecordingSleeper::new();

        let err = invoker(&service, &sleeper, RetryPolicy::default())
            .invoke(&[], &[])
            .await
            .unwrap_err();

        assert_eq!(err, InvokeError::Fatal(ServiceError::Other("bad request".into())));
        assert_eq!(service.call_count(), 1);
        assert_eq!(sleeper.sleep_count(), 0);
    }

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(5)).await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
