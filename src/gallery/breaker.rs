//! Availability circuit breaker guarding the remote gallery dependency.
//!
//! One shared instance covers the entire remote endpoint (not one per
//! gallery). State machine:
//!
//! - `CLOSED` (initial): calls pass through. Reaching `failure_threshold`
//!   consecutive failures opens the breaker.
//! - `OPEN`: calls are rejected immediately without touching the remote,
//!   until `open_timeout` has elapsed since the last failure.
//! - `HALF_OPEN`: exactly one trial call is let through; success closes the
//!   breaker and resets the failure count, failure reopens it.
//!
//! Transitions are serialized under a mutex so interleaved resolutions never
//! observe a partial update, and two callers racing into `HALF_OPEN` cannot
//! both become the trial call.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Outcome of a gated call: either the breaker refused it, or the wrapped
/// operation itself failed.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error("circuit breaker is open")]
    Open,

    #[error(transparent)]
    Inner(E),
}

/// Snapshot of the breaker for the operator/debug surface.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStats {
    pub state: BreakerState,
    pub failure_count: u32,
    pub last_failure: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failure_count: u32,
    /// Monotonic instant of the most recent failure, for timeout checks.
    last_failure_at: Option<Instant>,
    /// Wall-clock twin of `last_failure_at`, reported in stats.
    last_failure_wall: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
    pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(failure_threshold: u32, open_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            open_timeout,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure_at: None,
                last_failure_wall: None,
            }),
        }
    }

    /// Run `op` through the breaker.
    ///
    /// Rejected immediately with [`BreakerError::Open`] while the breaker is
    /// open and the timeout has not elapsed, or while a half-open trial call
    /// is already in flight. The operation's own error is wrapped in
    /// [`BreakerError::Inner`] and counts toward the failure threshold.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.begin_attempt()?;

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(BreakerError::Inner(err))
            }
        }
    }

    pub fn stats(&self) -> BreakerStats {
        let inner = self.inner.lock().unwrap();
        BreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            last_failure: inner.last_failure_wall,
        }
    }

    /// Force the breaker closed with a zero failure count.
    ///
    /// Operator/debug action, never taken by the normal resolution flow.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = BreakerState::Closed;
        inner.failure_count = 0;
        inner.last_failure_at = None;
        inner.last_failure_wall = None;
        info!("circuit breaker manually reset");
    }

    /// Decide whether a call may proceed, claiming the half-open trial slot
    /// when the open timeout has elapsed.
    fn begin_attempt<E>(&self) -> Result<(), BreakerError<E>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let timed_out = inner
                    .last_failure_at
                    .is_some_and(|at| at.elapsed() > self.open_timeout);

                if timed_out {
                    inner.state = BreakerState::HalfOpen;
                    debug!("circuit breaker half-open, letting trial call through");
                    Ok(())
                } else {
                    Err(BreakerError::Open)
                }
            }
            // The trial call is already in flight.
            BreakerState::HalfOpen => Err(BreakerError::Open),
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != BreakerState::Closed {
            info!("circuit breaker closed after successful call");
        }
        inner.failure_count = 0;
        inner.state = BreakerState::Closed;
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failure_count += 1;
        inner.last_failure_at = Some(Instant::now());
        inner.last_failure_wall = Some(Utc::now());

        let should_open = inner.state == BreakerState::HalfOpen
            || inner.failure_count >= self.failure_threshold;

        if should_open && inner.state != BreakerState::Open {
            inner.state = BreakerState::Open;
            warn!(
                failure_count = inner.failure_count,
                "circuit breaker opened"
            );
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAILURE_THRESHOLD, Self::DEFAULT_OPEN_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct TestError;

    async fn fail_once(breaker: &CircuitBreaker) {
        let result = breaker
            .execute(|| async { Err::<(), _>(TestError) })
            .await;
        assert!(matches!(result, Err(BreakerError::Inner(TestError))));
    }

    #[tokio::test]
    async fn test_opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));

        fail_once(&breaker).await;
        fail_once(&breaker).await;
        assert_eq!(breaker.stats().state, BreakerState::Closed);

        fail_once(&breaker).await;
        let stats = breaker.stats();
        assert_eq!(stats.state, BreakerState::Open);
        assert_eq!(stats.failure_count, 3);
        assert!(stats.last_failure.is_some());
    }

    #[tokio::test]
    async fn test_open_rejects_without_invoking_operation() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(30));
        fail_once(&breaker).await;

        let invocations = AtomicU32::new(0);
        let result = breaker
            .execute(|| async {
                invocations.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(())
            })
            .await;

        assert!(matches!(result, Err(BreakerError::Open)));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_trial_closes_on_success() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(30));
        fail_once(&breaker).await;
        assert_eq!(breaker.stats().state, BreakerState::Open);

        tokio::time::advance(Duration::from_secs(31)).await;

        let result = breaker
            .execute(|| async { Ok::<_, TestError>(7) })
            .await;

        assert_eq!(result.unwrap(), 7);
        let stats = breaker.stats();
        assert_eq!(stats.state, BreakerState::Closed);
        assert_eq!(stats.failure_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_trial_reopens_on_failure() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(30));
        fail_once(&breaker).await;

        tokio::time::advance(Duration::from_secs(31)).await;
        fail_once(&breaker).await;

        let stats = breaker.stats();
        assert_eq!(stats.state, BreakerState::Open);
        assert_eq!(stats.failure_count, 2);

        // The fresh failure restarts the open timeout.
        let result = breaker
            .execute(|| async { Ok::<_, TestError>(()) })
            .await;
        assert!(matches!(result, Err(BreakerError::Open)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_half_open_trial_at_a_time() {
        let breaker = Arc::new(CircuitBreaker::new(1, Duration::from_secs(30)));
        fail_once(&breaker).await;

        tokio::time::advance(Duration::from_secs(31)).await;

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let trial_breaker = Arc::clone(&breaker);
        let trial = tokio::spawn(async move {
            trial_breaker
                .execute(|| async move {
                    gate.await.unwrap();
                    Ok::<_, TestError>(42)
                })
                .await
        });

        // Let the trial claim the half-open slot before racing it.
        tokio::task::yield_now().await;
        assert_eq!(breaker.stats().state, BreakerState::HalfOpen);

        let racer = breaker
            .execute(|| async { Ok::<_, TestError>(0) })
            .await;
        assert!(matches!(racer, Err(BreakerError::Open)));

        release.send(()).unwrap();
        assert_eq!(trial.await.unwrap().unwrap(), 42);
        assert_eq!(breaker.stats().state, BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_reset_forces_closed() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(30));
        fail_once(&breaker).await;
        assert_eq!(breaker.stats().state, BreakerState::Open);

        breaker.reset();

        let stats = breaker.stats();
        assert_eq!(stats.state, BreakerState::Closed);
        assert_eq!(stats.failure_count, 0);
        assert!(stats.last_failure.is_none());
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        fail_once(&breaker).await;
        fail_once(&breaker).await;

        breaker
            .execute(|| async { Ok::<_, TestError>(()) })
            .await
            .unwrap();

        assert_eq!(breaker.stats().failure_count, 0);

        // A fresh run of failures is needed to open the breaker again.
        fail_once(&breaker).await;
        fail_once(&breaker).await;
        assert_eq!(breaker.stats().state, BreakerState::Closed);
    }
}
