//! # Total time budget.
//!
//! [`MaxDuration`] clips delays to the time left and stops once the budget is spent.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::backoff::{Backoff, BackoffRef};
use crate::policies::reset::Decorator;

/// Best-effort limit on the total time a sequence runs.
///
/// The clock starts at construction (and again at every reset). Each call returns
/// the inner delay clipped to the time remaining, and stops once nothing remains.
/// It does not abort work already in flight, so a loop may overrun `timeout` by
/// the length of one operation.
///
/// Uses [`tokio::time::Instant`], so paused-clock tests can advance it.
pub struct MaxDuration {
    timeout: Duration,
    start: RwLock<Instant>,
    inner: BackoffRef,
}

impl MaxDuration {
    /// Wraps `inner`, limiting the sequence to `timeout` from now.
    pub fn new(timeout: Duration, inner: BackoffRef) -> Self {
        Self {
            timeout,
            start: RwLock::new(Instant::now()),
            inner,
        }
    }

    fn remaining(&self) -> Option<Duration> {
        let start = *self.start.read().unwrap_or_else(PoisonError::into_inner);
        self.timeout
            .checked_sub(start.elapsed())
            .filter(|left| !left.is_zero())
    }
}

impl Backoff for MaxDuration {
    fn next(&self) -> Option<Duration> {
        let remaining = self.remaining()?;
        let val = self.inner.next()?;
        if val.is_zero() || val > remaining {
            return Some(remaining);
        }
        Some(val)
    }

    fn reset(&self) {
        *self.start.write().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.inner.reset();
    }
}

impl Decorator for MaxDuration {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self::new(self.timeout, self.inner.clone())
    }
}
