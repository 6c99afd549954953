//! Bounded retry/backoff policy and operation hook contracts.

use std::future::Future;
use std::time::Duration;

use crate::TransportError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A policy that never retries; used for mid-tool-loop resubmissions.
    pub fn none() -> Self {
        Self::new(1)
    }

    pub fn should_retry(&self, attempt: u32, error: &TransportError) -> bool {
        error.retryable && attempt < self.max_attempts
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

pub trait TransportOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _model: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _model: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &TransportError,
    ) {
    }

    fn on_success(&self, _operation: &str, _model: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _model: &str, _attempts: u32, _error: &TransportError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl TransportOperationHooks for NoopOperationHooks {}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    model: &str,
    policy: &RetryPolicy,
    hooks: &dyn TransportOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, TransportError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, TransportError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, model, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, model, attempt);
                return Ok(value);
            }
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    let delay = policy.backoff_for_attempt(attempt);
                    hooks.on_retry_scheduled(operation, model, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                hooks.on_failure(operation, model, attempt, &error);
                return Err(error);
            }
        }
    }
}
