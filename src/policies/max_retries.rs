//! # Retry limit.
//!
//! [`MaxRetries`] cuts the inner sequence short after a fixed number of delays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::backoff::{Backoff, BackoffRef};
use crate::policies::reset::Decorator;

/// Stops the sequence after `max` delays.
///
/// `max` bounds *retries*: a loop driven by this backoff makes the initial attempt
/// plus at most `max` retries. The counter is independent of the inner one and is
/// advanced with a conditional atomic increment, so once it reaches `max` the
/// inner backoff is no longer consulted.
pub struct MaxRetries {
    max: u64,
    attempt: AtomicU64,
    inner: BackoffRef,
}

impl MaxRetries {
    /// Wraps `inner`, allowing `max` delays.
    pub fn new(max: u64, inner: BackoffRef) -> Self {
        Self {
            max,
            attempt: AtomicU64::new(0),
            inner,
        }
    }

    /// The configured retry limit.
    pub fn max(&self) -> u64 {
        self.max
    }
}

impl Backoff for MaxRetries {
    fn next(&self) -> Option<Duration> {
        self.attempt
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |a| {
                (a < self.max).then_some(a + 1)
            })
            .ok()?;
        self.inner.next()
    }

    fn reset(&self) {
        self.attempt.store(0, Ordering::Release);
        self.inner.reset();
    }
}

impl Decorator for MaxRetries {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self::new(self.max, self.inner.clone())
    }
}
