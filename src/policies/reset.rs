//! # Resettable composition.
//!
//! [`WithReset`] holds the currently active chain plus a `rebuild` procedure.
//! [`Backoff::next`] delegates to the active chain; [`Backoff::reset`] calls
//! `rebuild` and swaps the result in. The old chain is dropped, not reset.
//!
//! ```text
//! with_max_retries(3, with_capped_duration(5s, fib))
//!   reset()
//!     └─► rebuild(): reset inner (capped → rebuild: reset fib, fresh capped)
//!                    fresh MaxRetries { attempt: 0, inner }
//! ```
//!
//! Every built-in `with_*` constructor installs a `rebuild` that resets its inner
//! chain and wraps it in a fresh decorator, so reset reaches the whole stack.
//! A caller-supplied `rebuild` (see [`with_reset`]) replaces that behaviour: only
//! what it builds is active after the reset, and any decorators applied before
//! that point are left out.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backoff::{Backoff, BackoffRef};
use crate::error::BackoffError;
use crate::policies::{CappedDuration, Jitter, JitterPercent, MaxDuration, MaxRetries, WithCancel};

/// A decorator that can produce a fresh copy of itself around its reset inner chain.
pub(crate) trait Decorator: Backoff + Sized + 'static {
    /// Resets the wrapped chain and returns a new instance in its initial state.
    fn rebuild(&self) -> Self;
}

type Rebuild = Box<dyn Fn() -> BackoffRef + Send + Sync>;

/// Backoff whose `reset` rebuilds the active chain from a procedure.
pub struct WithReset {
    active: RwLock<BackoffRef>,
    rebuild: Rebuild,
}

impl WithReset {
    /// Creates the wrapper with `initial` active and `rebuild` as its reset procedure.
    pub fn new<F>(rebuild: F, initial: BackoffRef) -> Self
    where
        F: Fn() -> BackoffRef + Send + Sync + 'static,
    {
        Self {
            active: RwLock::new(initial),
            rebuild: Box::new(rebuild),
        }
    }

    /// Returns a handle to the chain currently in use.
    pub fn active(&self) -> BackoffRef {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wraps `decorator` with a rebuild that resets its inner chain and
    /// constructs a fresh decorator around it.
    pub(crate) fn decorated<D: Decorator>(decorator: D) -> Self {
        let template = Arc::new(decorator);
        let initial: BackoffRef = template.clone();
        Self::new(move || -> BackoffRef { Arc::new(template.rebuild()) }, initial)
    }
}

impl Backoff for WithReset {
    fn next(&self) -> Option<Duration> {
        self.active().next()
    }

    fn reset(&self) {
        let fresh = (self.rebuild)();
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }
}

/// Wraps `initial` so that `reset` replaces it with whatever `rebuild` returns.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use retryvisor::{Backoff, BackoffRef, Constant, with_capped_duration, with_reset};
///
/// let fast: BackoffRef = Constant::arc(Duration::from_millis(10)).unwrap();
/// let capped = with_capped_duration(Duration::from_millis(5), fast);
///
/// // after a reset, drop the cap and run at a slower constant pace
/// let b = with_reset(
///     || Constant::arc(Duration::from_secs(1)).unwrap() as BackoffRef,
///     Arc::new(capped),
/// );
/// assert_eq!(b.next(), Some(Duration::from_millis(5)));
/// b.reset();
/// assert_eq!(b.next(), Some(Duration::from_secs(1)));
/// ```
pub fn with_reset<F>(rebuild: F, initial: BackoffRef) -> WithReset
where
    F: Fn() -> BackoffRef + Send + Sync + 'static,
{
    WithReset::new(rebuild, initial)
}

/// Resettable [`Jitter`] around `inner`.
pub fn with_jitter(spread: Duration, inner: BackoffRef) -> Result<WithReset, BackoffError> {
    Jitter::new(spread, inner).map(WithReset::decorated)
}

/// Resettable [`JitterPercent`] around `inner`.
pub fn with_jitter_percent(percent: u64, inner: BackoffRef) -> Result<WithReset, BackoffError> {
    JitterPercent::new(percent, inner).map(WithReset::decorated)
}

/// Resettable [`MaxRetries`] around `inner`.
pub fn with_max_retries(max: u64, inner: BackoffRef) -> WithReset {
    WithReset::decorated(MaxRetries::new(max, inner))
}

/// Resettable [`CappedDuration`] around `inner`.
pub fn with_capped_duration(cap: Duration, inner: BackoffRef) -> WithReset {
    WithReset::decorated(CappedDuration::new(cap, inner))
}

/// Resettable [`MaxDuration`] around `inner`.
pub fn with_max_duration(timeout: Duration, inner: BackoffRef) -> WithReset {
    WithReset::decorated(MaxDuration::new(timeout, inner))
}

/// Resettable [`WithCancel`] around `inner`.
pub fn with_cancel(token: CancellationToken, inner: BackoffRef) -> WithReset {
    WithReset::decorated(WithCancel::new(token, inner))
}

/// Fluent chaining of the resettable constructors.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use retryvisor::{Backoff, BackoffExt, BackoffRef, Fibonacci};
///
/// let fib: BackoffRef = Fibonacci::arc(Duration::from_secs(1)).unwrap();
/// let b = fib
///     .capped_duration(Duration::from_secs(5))
///     .max_retries(2);
///
/// assert_eq!(b.next(), Some(Duration::from_secs(1)));
/// assert_eq!(b.next(), Some(Duration::from_secs(2)));
/// assert_eq!(b.next(), None);
/// ```
pub trait BackoffExt {
    /// See [`with_jitter`].
    fn jitter(self, spread: Duration) -> Result<BackoffRef, BackoffError>;
    /// See [`with_jitter_percent`].
    fn jitter_percent(self, percent: u64) -> Result<BackoffRef, BackoffError>;
    /// See [`with_max_retries`].
    fn max_retries(self, max: u64) -> BackoffRef;
    /// See [`with_capped_duration`].
    fn capped_duration(self, cap: Duration) -> BackoffRef;
    /// See [`with_max_duration`].
    fn max_duration(self, timeout: Duration) -> BackoffRef;
    /// See [`with_cancel`].
    fn cancel_on(self, token: CancellationToken) -> BackoffRef;
}

impl BackoffExt for BackoffRef {
    fn jitter(self, spread: Duration) -> Result<BackoffRef, BackoffError> {
        Ok(Arc::new(with_jitter(spread, self)?))
    }

    fn jitter_percent(self, percent: u64) -> Result<BackoffRef, BackoffError> {
        Ok(Arc::new(with_jitter_percent(percent, self)?))
    }

    fn max_retries(self, max: u64) -> BackoffRef {
        Arc::new(with_max_retries(max, self))
    }

    fn capped_duration(self, cap: Duration) -> BackoffRef {
        Arc::new(with_capped_duration(cap, self))
    }

    fn max_duration(self, timeout: Duration) -> BackoffRef {
        Arc::new(with_max_duration(timeout, self))
    }

    fn cancel_on(self, token: CancellationToken) -> BackoffRef {
        Arc::new(with_cancel(token, self))
    }
}
