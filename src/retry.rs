//! # Retry loop.
//!
//! Runs an operation until it succeeds, fails with a non-retryable error, the
//! backoff stops, or the caller's token is cancelled.
//!
//! ```text
//! loop {
//!   ├─► token cancelled?            → Err(Canceled)
//!   ├─► op(child token).await
//!   │     ├─► Ok(v)                 → Ok(v)
//!   │     ├─► Err(Fatal(e))         → Err(NonRetryable(e))
//!   │     └─► Err(Retryable(e))
//!   ├─► backoff.next() == None      → Err(BackoffExhausted(e))
//!   ├─► token cancelled?            → Err(Canceled)
//!   └─► select! { biased; cancelled → Err(Canceled), sleep(delay) → continue }
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**; the operation is never interrupted while running
//! - Each attempt receives a **child token** of the caller's token; cancelling it
//!   ends that attempt's scope only, the loop keeps observing the caller's token
//! - The backoff is borrowed, so several loops may share one instance
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{AttemptError, BackoffExt, BackoffRef, Constant, RetryError, retry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let token = CancellationToken::new();
//! let base: BackoffRef = Constant::arc(Duration::from_millis(1)).unwrap();
//! let backoff = base.max_retries(2);
//!
//! let mut calls = 0;
//! let res: Result<(), RetryError<&str>> = retry::run(&token, &backoff, |_attempt| {
//!     calls += 1;
//!     async { Err(AttemptError::retryable("not yet")) }
//! })
//! .await;
//!
//! assert_eq!(calls, 3);
//! assert_eq!(res.unwrap_err().into_cause(), Some("not yet"));
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backoff::{Backoff, Constant, Exponential, Fibonacci};
use crate::core::runner::{Step, next_step, pause};
use crate::error::{AttemptError, RetryError};

const OPERATION: &str = "retry";

/// Retries `op` according to `backoff` until it succeeds or a terminal outcome is reached.
///
/// ### Outcomes
/// - `Ok(T)`: an attempt succeeded
/// - [`RetryError::NonRetryable`]: an attempt failed with [`AttemptError::Fatal`]
/// - [`RetryError::BackoffExhausted`]: the backoff signaled stop; carries the last retryable cause
/// - [`RetryError::Canceled`]: `token` fired at a checkpoint or during a wait
pub async fn run<T, E, B, F, Fut>(
    token: &CancellationToken,
    backoff: &B,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    B: Backoff + ?Sized,
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let mut attempt: u64 = 0;

    loop {
        if token.is_cancelled() {
            debug!(operation = OPERATION, attempts = attempt, "canceled before attempt");
            return Err(RetryError::Canceled);
        }

        attempt += 1;
        let err = match op(token.child_token()).await {
            Ok(v) => return Ok(v),
            Err(AttemptError::Fatal(e)) => {
                debug!(operation = OPERATION, attempts = attempt, error = %e, "non retryable error");
                return Err(RetryError::NonRetryable(e));
            }
            Err(AttemptError::Retryable(e)) => e,
        };

        let delay = match next_step(OPERATION, token, backoff, attempt, Some(&err)) {
            Step::Wait(delay) => delay,
            Step::Exhausted => return Err(RetryError::BackoffExhausted(err)),
            Step::Canceled => return Err(RetryError::Canceled),
        };
        if !pause(OPERATION, token, delay, attempt).await {
            return Err(RetryError::Canceled);
        }
    }
}

/// Retries `op` with a [`Constant`] backoff of `base`.
pub async fn constant<T, E, F, Fut>(
    token: &CancellationToken,
    base: Duration,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let backoff = Constant::new(base)?;
    run(token, &backoff, op).await
}

/// Retries `op` with an [`Exponential`] backoff starting at `base`.
pub async fn exponential<T, E, F, Fut>(
    token: &CancellationToken,
    base: Duration,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let backoff = Exponential::new(base)?;
    run(token, &backoff, op).await
}

/// Retries `op` with a [`Fibonacci`] backoff starting at `base`.
pub async fn fibonacci<T, E, F, Fut>(
    token: &CancellationToken,
    base: Duration,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let backoff = Fibonacci::new(base)?;
    run(token, &backoff, op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::BackoffRef;
    use crate::error::BackoffError;
    use crate::policies::{BackoffExt, MaxRetries};
    use std::error::Error as _;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("flaky")]
    struct Flaky;

    fn one_ns() -> BackoffRef {
        Constant::arc(Duration::from_nanos(1)).unwrap()
    }

    #[tokio::test]
    async fn test_exhausted_after_max_retries_plus_one_attempts() {
        let token = CancellationToken::new();
        let backoff = MaxRetries::new(3, one_ns());
        let calls = AtomicU32::new(0);

        let res: Result<(), _> = run(&token, &backoff, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::retryable(Flaky)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let err = res.unwrap_err();
        assert_eq!(err.as_label(), "retry_backoff_exhausted");
        assert_eq!(err.cause(), Some(&Flaky));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_non_retryable_stops_on_first_attempt() {
        let token = CancellationToken::new();
        let backoff = one_ns();
        let calls = AtomicU32::new(0);

        let res: Result<(), _> = run(&token, &backoff, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::fatal(Flaky)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(res, Err(RetryError::NonRetryable(Flaky))));
    }

    #[tokio::test]
    async fn test_success_after_retries() {
        let token = CancellationToken::new();
        let backoff = one_ns();
        let mut calls = 0;

        let res = run(&token, &backoff, |_| {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(AttemptError::retryable(Flaky))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(res, Ok(3));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let res: Result<(), RetryError<Flaky>> = run(&token, &one_ns(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert!(calls.load(Ordering::SeqCst) <= 1);
        assert!(res.unwrap_err().is_canceled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_wait() {
        let token = CancellationToken::new();
        let backoff = Constant::new(Duration::from_secs(3600)).unwrap();
        let calls = AtomicU32::new(0);

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                token.cancel();
            })
        };

        let start = tokio::time::Instant::now();
        let res: Result<(), _> = run(&token, &backoff, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::retryable(Flaky)) }
        })
        .await;

        assert!(matches!(res, Err(RetryError::Canceled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(3600));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_attempt_token_is_child_of_caller() {
        let token = CancellationToken::new();
        let backoff = one_ns().max_retries(1);

        let res: Result<(), _> = run(&token, &backoff, |attempt| {
            // cancelling the attempt scope leaves the loop running
            attempt.cancel();
            async { Err(AttemptError::retryable(Flaky)) }
        })
        .await;

        assert!(!token.is_cancelled());
        assert!(matches!(res, Err(RetryError::BackoffExhausted(Flaky))));
    }

    #[tokio::test]
    async fn test_operation_sees_caller_cancellation() {
        let token = CancellationToken::new();

        let res: Result<(), _> = run(&token, &one_ns(), |attempt| {
            let token = token.clone();
            async move {
                token.cancel();
                assert!(attempt.is_cancelled());
                Err(AttemptError::retryable(Flaky))
            }
        })
        .await;

        assert!(matches!(res, Err(RetryError::Canceled)));
    }

    #[tokio::test]
    async fn test_wrappers_reject_zero_base() {
        let token = CancellationToken::new();
        let op = |_| async { Ok::<_, AttemptError<Flaky>>(()) };

        for res in [
            constant(&token, Duration::ZERO, op).await,
            exponential(&token, Duration::ZERO, op).await,
            fibonacci(&token, Duration::ZERO, op).await,
        ] {
            assert!(matches!(
                res,
                Err(RetryError::InvalidBackoff(BackoffError::InvalidParameter { .. }))
            ));
        }
    }

    #[tokio::test]
    async fn test_wrappers_run_until_success() {
        let token = CancellationToken::new();
        let base = Duration::from_nanos(1);

        let calls = AtomicU32::new(0);
        let op = |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n % 2 == 0 {
                    Err(AttemptError::retryable(Flaky))
                } else {
                    Ok(n)
                }
            }
        };

        assert_eq!(constant(&token, base, op).await, Ok(1));
        assert_eq!(exponential(&token, base, op).await, Ok(3));
        assert_eq!(fibonacci(&token, base, op).await, Ok(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_backoff_across_loops() {
        let token = CancellationToken::new();
        let backoff = Arc::new(MaxRetries::new(20, one_ns()));
        let calls = Arc::new(AtomicU32::new(0));

        let handles = (0..4).map(|_| {
            let token = token.clone();
            let backoff = backoff.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                run(&token, &backoff, |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(AttemptError::retryable(Flaky)) }
                })
                .await
            })
        });

        for res in futures::future::join_all(handles).await {
            assert!(matches!(res.unwrap(), Err(RetryError::BackoffExhausted(Flaky))));
        }
        // 20 shared retries plus one initial attempt per loop
        assert_eq!(calls.load(Ordering::SeqCst), 24);
    }
}
