//! # Repeat loop.
//!
//! Runs an operation over and over, pausing between runs according to a backoff,
//! until the operation asks to stop, the backoff stops, or the token is cancelled.
//!
//! Two forms:
//! - [`run`]: the operation returns `bool`; `false` stops the loop with
//!   [`RepeatError::FunctionStopped(None)`](RepeatError::FunctionStopped)
//! - [`run_until_error`]: the operation returns `Result<(), E>`; any `Err(e)` stops the
//!   loop with `FunctionStopped(Some(e))`
//!
//! The backoff and cancellation checkpoints match [`retry`](crate::retry): cancellation
//! is checked before each run and again before each wait, and it wins a tie with the timer.
//! A repeat loop never returns `Ok`; every exit is one of the [`RepeatError`] variants.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{Constant, RepeatError, repeat};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let token = CancellationToken::new();
//! let backoff = Constant::new(Duration::from_millis(1)).unwrap();
//!
//! let mut polls = 0;
//! let res = repeat::run(&token, &backoff, |_| {
//!     polls += 1;
//!     let more = polls < 5;
//!     async move { more }
//! })
//! .await;
//!
//! assert_eq!(polls, 5);
//! assert!(matches!(res, RepeatError::FunctionStopped(None)));
//! # }
//! ```

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backoff::{Backoff, Constant, Exponential, Fibonacci};
use crate::core::runner::{Step, next_step, pause};
use crate::error::RepeatError;

const OPERATION: &str = "repeat";

/// Repeats `op` while it returns `true`.
///
/// Returns the reason the loop ended.
pub async fn run<B, F, Fut>(token: &CancellationToken, backoff: &B, mut op: F) -> RepeatError
where
    B: Backoff + ?Sized,
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = bool>,
{
    repeat_loop(token, backoff, |attempt| {
        let fut = op(attempt);
        async move {
            if fut.await {
                Ok(())
            } else {
                Err(None::<Infallible>)
            }
        }
    })
    .await
}

/// Repeats `op` until it returns an error.
///
/// Returns the reason the loop ended; the operation's error is carried by
/// [`RepeatError::FunctionStopped`].
pub async fn run_until_error<E, B, F, Fut>(
    token: &CancellationToken,
    backoff: &B,
    mut op: F,
) -> RepeatError<E>
where
    B: Backoff + ?Sized,
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    repeat_loop(token, backoff, |attempt| {
        let fut = op(attempt);
        async move { fut.await.map_err(Some) }
    })
    .await
}

/// Shared loop: `Err(None)` is a plain stop, `Err(Some(e))` a stop with a cause.
async fn repeat_loop<E, B, F, Fut>(token: &CancellationToken, backoff: &B, mut op: F) -> RepeatError<E>
where
    B: Backoff + ?Sized,
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), Option<E>>>,
    E: Display,
{
    let mut attempt: u64 = 0;

    loop {
        if token.is_cancelled() {
            debug!(operation = OPERATION, attempts = attempt, "canceled before run");
            return RepeatError::Canceled;
        }

        attempt += 1;
        if let Err(cause) = op(token.child_token()).await {
            match &cause {
                Some(e) => debug!(operation = OPERATION, attempts = attempt, error = %e, "function stopped"),
                None => debug!(operation = OPERATION, attempts = attempt, "function stopped"),
            }
            return RepeatError::FunctionStopped(cause);
        }

        let delay = match next_step(OPERATION, token, backoff, attempt, None) {
            Step::Wait(delay) => delay,
            Step::Exhausted => return RepeatError::BackoffExhausted,
            Step::Canceled => return RepeatError::Canceled,
        };
        if !pause(OPERATION, token, delay, attempt).await {
            return RepeatError::Canceled;
        }
    }
}

/// Repeats `op` with a [`Constant`] backoff of `base`.
pub async fn constant<F, Fut>(token: &CancellationToken, base: Duration, op: F) -> RepeatError
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = bool>,
{
    match Constant::new(base) {
        Ok(backoff) => run(token, &backoff, op).await,
        Err(e) => e.into(),
    }
}

/// Repeats `op` with an [`Exponential`] backoff starting at `base`.
pub async fn exponential<F, Fut>(token: &CancellationToken, base: Duration, op: F) -> RepeatError
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = bool>,
{
    match Exponential::new(base) {
        Ok(backoff) => run(token, &backoff, op).await,
        Err(e) => e.into(),
    }
}

/// Repeats `op` with a [`Fibonacci`] backoff starting at `base`.
pub async fn fibonacci<F, Fut>(token: &CancellationToken, base: Duration, op: F) -> RepeatError
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = bool>,
{
    match Fibonacci::new(base) {
        Ok(backoff) => run(token, &backoff, op).await,
        Err(e) => e.into(),
    }
}
