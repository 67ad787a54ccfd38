//! # Backoff abstraction and base generators.
//!
//! A [`Backoff`] is a stateful generator of wait durations plus a stop signal.
//! Every implementation in this crate is safe to share between concurrent callers.
//!
//! - [`Backoff`] - the capability contract (`next` / `reset`)
//! - [`BackoffRef`] - shared handle (`Arc<dyn Backoff>`), the unit decorators wrap
//! - [`BackoffFn`] - function-backed backoff
//! - [`Constant`], [`Exponential`], [`Fibonacci`] - base sequences
//!
//! ## Saturation
//! Base generators never signal stop on their own. When a value no longer fits in
//! a [`Duration`], they return [`Duration::MAX`] from then on.

mod backoff_fn;
mod constant;
mod exponential;
mod fibonacci;

use std::sync::Arc;
use std::time::Duration;

pub use backoff_fn::BackoffFn;
pub use constant::Constant;
pub use exponential::Exponential;
pub use fibonacci::Fibonacci;

use crate::error::BackoffError;

/// # Stateful sequence of wait durations.
///
/// `next` returns `Some(delay)` to continue or `None` once the sequence is
/// exhausted. `reset` returns the backoff (and everything it wraps) to the state
/// it had at construction.
///
/// Both methods may be called concurrently from any number of threads. A
/// `reset` racing a `next` may interleave either way but never corrupts state.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use retryvisor::{Backoff, Exponential};
///
/// let b = Exponential::new(Duration::from_millis(10)).unwrap();
/// assert_eq!(b.next(), Some(Duration::from_millis(10)));
/// assert_eq!(b.next(), Some(Duration::from_millis(20)));
/// b.reset();
/// assert_eq!(b.next(), Some(Duration::from_millis(10)));
/// ```
pub trait Backoff: Send + Sync {
    /// Returns the next delay, or `None` when the caller should stop.
    fn next(&self) -> Option<Duration>;

    /// Restores the initial state.
    fn reset(&self);
}

/// Shared handle to a backoff.
pub type BackoffRef = Arc<dyn Backoff>;

impl<B: Backoff + ?Sized> Backoff for &B {
    fn next(&self) -> Option<Duration> {
        (**self).next()
    }

    fn reset(&self) {
        (**self).reset()
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next(&self) -> Option<Duration> {
        (**self).next()
    }

    fn reset(&self) {
        (**self).reset()
    }
}

impl<B: Backoff + ?Sized> Backoff for Arc<B> {
    fn next(&self) -> Option<Duration> {
        (**self).next()
    }

    fn reset(&self) {
        (**self).reset()
    }
}

/// Rejects a zero base duration.
pub(crate) fn ensure_positive(name: &'static str, value: Duration) -> Result<(), BackoffError> {
    if value.is_zero() {
        return Err(BackoffError::InvalidParameter { name, value });
    }
    Ok(())
}

/// Converts a nanosecond count to a `Duration`, `None` if it does not fit.
pub(crate) fn duration_from_nanos(nanos: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    // remainder is < 1e9, always fits
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, subsec))
}
