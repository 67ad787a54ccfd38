//! # Per-delay cap.
//!
//! [`CappedDuration`] clamps every delay of the inner sequence to an upper bound.

use std::time::Duration;

use crate::backoff::{Backoff, BackoffRef};
use crate::policies::reset::Decorator;

/// Caps each individual delay at `cap`.
///
/// This bounds the value of one call only, never the number of calls or the total
/// time spent; without another decorator the sequence continues indefinitely.
/// A zero inner delay is also replaced by `cap`.
pub struct CappedDuration {
    cap: Duration,
    inner: BackoffRef,
}

impl CappedDuration {
    /// Wraps `inner`, capping each delay at `cap`.
    pub fn new(cap: Duration, inner: BackoffRef) -> Self {
        Self { cap, inner }
    }
}

impl Backoff for CappedDuration {
    fn next(&self) -> Option<Duration> {
        let val = self.inner.next()?;
        if val.is_zero() || val > self.cap {
            return Some(self.cap);
        }
        Some(val)
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

impl Decorator for CappedDuration {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self::new(self.cap, self.inner.clone())
    }
}
