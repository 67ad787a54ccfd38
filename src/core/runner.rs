//! # Shared backoff step of the retry and repeat loops.
//!
//! After an attempt asks to go again, both loops run the same three steps:
//!
//! ```text
//! backoff.next() ──► None ─────────────────────────────► Exhausted
//!       │
//!       ▼ Some(delay)
//! token.is_cancelled() ──► yes ────────────────────────► Canceled
//!       │
//!       ▼ no
//! select! { biased;
//!   token.cancelled() ───────────────────────────────────► Canceled
//!   sleep(delay)      ───────────────────────────────────► Resume
//! }
//! ```
//!
//! ## Rules
//! - The select is **biased**: cancellation is polled first, so when the token
//!   fires and the timer elapses in the same poll, cancellation wins
//! - A pending timer is dropped (and deregistered) when cancellation wins
//! - This is the only step of either loop that suspends

use std::fmt::Display;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::backoff::Backoff;

/// What the loop does after an attempt asked to go again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Wait this long, then start the next attempt.
    Wait(Duration),
    /// The backoff signaled stop.
    Exhausted,
    /// The token fired before the wait started.
    Canceled,
}

/// Asks `backoff` for the next delay and re-checks `token` before any wait.
///
/// `operation` and `attempt` label the tracing events; `error` is the cause that
/// prompted another attempt, if the loop has one.
pub(crate) fn next_step<B>(
    operation: &'static str,
    token: &CancellationToken,
    backoff: &B,
    attempt: u64,
    error: Option<&dyn Display>,
) -> Step
where
    B: Backoff + ?Sized,
{
    let Some(delay) = backoff.next() else {
        debug!(operation, attempts = attempt, "backoff exhausted");
        return Step::Exhausted;
    };

    if token.is_cancelled() {
        debug!(operation, attempts = attempt, "canceled before backoff wait");
        return Step::Canceled;
    }

    trace!(
        operation,
        attempt,
        delay_ms = delay_millis(delay),
        error = error.map(tracing::field::display),
        "backoff scheduled"
    );
    Step::Wait(delay)
}

/// Waits out `delay` unless `token` fires first; returns `false` on cancellation.
pub(crate) async fn pause(
    operation: &'static str,
    token: &CancellationToken,
    delay: Duration,
    attempt: u64,
) -> bool {
    let resumed = wait(token, delay).await;
    if !resumed {
        debug!(operation, attempts = attempt, "canceled during backoff wait");
    }
    resumed
}

/// Sleeps for `delay`; returns `false` if `token` fired first.
pub(crate) async fn wait(token: &CancellationToken, delay: Duration) -> bool {
    let sleep = time::sleep(delay);
    tokio::pin!(sleep);

    select! {
        biased;
        _ = token.cancelled() => false,
        _ = &mut sleep => true,
    }
}

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
