//! # Function-backed backoff (`BackoffFn`)
//!
//! [`BackoffFn`] wraps a closure `F: Fn() -> Option<Duration>` and calls it on
//! every [`Backoff::next`]. It has no state of its own, so [`Backoff::reset`] is
//! a no-op; if the closure keeps state, that state is the closure's business.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{Backoff, BackoffFn, BackoffRef};
//!
//! let b: BackoffRef = BackoffFn::arc(|| Some(Duration::from_secs(1)));
//! assert_eq!(b.next(), Some(Duration::from_secs(1)));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::Backoff;

/// Function-backed backoff implementation.
pub struct BackoffFn<F> {
    f: F,
}

impl<F> BackoffFn<F>
where
    F: Fn() -> Option<Duration> + Send + Sync,
{
    /// Creates a new function-backed backoff.
    ///
    /// Prefer [`BackoffFn::arc`] when you immediately need a [`BackoffRef`](crate::BackoffRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the backoff and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> Backoff for BackoffFn<F>
where
    F: Fn() -> Option<Duration> + Send + Sync,
{
    fn next(&self) -> Option<Duration> {
        (self.f)()
    }

    fn reset(&self) {}
}
