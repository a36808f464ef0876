//! Exponential-backoff retry for retryable job failures.
//!
//! [`submit_with_retry`] submits a request and, while the job keeps
//! failing with a network or timeout failure, waits with increasing
//! delays and calls [`JobOrchestrator::retry`] until the attempts run out
//! or the [`CancellationToken`] is triggered.

use std::time::Duration;

use rustplay_core::{Backend, JobRequest};
use rustplay_events::{JobEvent, JobOutcome};
use tokio_util::sync::CancellationToken;

use crate::JobOrchestrator;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy allowing `retries` extra attempts with default delays.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Default::default()
        }
    }
}

/// Calculate the next backoff delay from the current delay and policy.
///
/// The result is clamped to [`RetryPolicy::max_delay`].
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}

fn is_retryable(event: &JobEvent) -> bool {
    matches!(
        event,
        JobEvent::JobFinished {
            outcome: JobOutcome::Error(failure),
            ..
        } if failure.is_retryable()
    )
}

/// Submit `request` and retry retryable failures with backoff.
///
/// Returns the last job's terminal event, or `None` if the orchestrator
/// went away or `cancel` fired while waiting between attempts.
pub async fn submit_with_retry<B: Backend>(
    orchestrator: &JobOrchestrator<B>,
    request: JobRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Option<JobEvent> {
    let mut event = orchestrator.submit(request).await.wait().await?;
    let mut delay = policy.initial_delay;
    let mut attempt = 1u32;

    while is_retryable(&event) && attempt < policy.max_attempts {
        attempt += 1;
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Retrying job after retryable failure",
        );

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        let handle = orchestrator.retry().await?;
        event = handle.wait().await?;
        delay = next_delay(delay, policy);
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let policy = RetryPolicy::default();
        let d = next_delay(Duration::from_secs(1), &policy);
        assert_eq!(d, Duration::from_secs(2));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(8), &policy);
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn custom_multiplier() {
        let policy = RetryPolicy {
            multiplier: 3.0,
            max_delay: Duration::from_secs(60),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(2), &policy);
        assert_eq!(d, Duration::from_secs(6));
    }

    #[test]
    fn full_backoff_sequence() {
        let policy = RetryPolicy::default();
        let mut delay = policy.initial_delay;
        let expected = [1, 2, 4, 8, 16, 30, 30];

        for &expected_secs in &expected {
            assert_eq!(delay.as_secs(), expected_secs);
            delay = next_delay(delay, &policy);
        }
    }

    #[test]
    fn with_retries_counts_first_attempt() {
        assert_eq!(RetryPolicy::with_retries(0).max_attempts, 1);
        assert_eq!(RetryPolicy::with_retries(3).max_attempts, 4);
        assert_eq!(RetryPolicy::with_retries(u32::MAX).max_attempts, u32::MAX);
    }
}
