//! # Fibonacci backoff.
//!
//! [`Fibonacci`] follows the Fibonacci sequence scaled by `base`:
//! `base × (1, 2, 3, 5, 8, 13, …)`.
//!
//! State is the pair `(previous, current)`, starting at `(0, base)`. Each call
//! moves `(p, c) → (c, p + c)` under a lock and returns the new current value, so
//! no two callers consume the same transition. When `p + c` overflows, the state
//! is left untouched and [`Duration::MAX`] is returned.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::backoff::{Backoff, ensure_positive};
use crate::error::BackoffError;

/// Fibonacci backoff. Safe for concurrent use.
#[derive(Debug)]
pub struct Fibonacci {
    base: Duration,
    state: Mutex<(Duration, Duration)>,
}

impl Fibonacci {
    /// Creates a Fibonacci backoff scaled by `base`. Fails if `base` is zero.
    pub fn new(base: Duration) -> Result<Self, BackoffError> {
        ensure_positive("fibonacci backoff base", base)?;
        Ok(Self {
            base,
            state: Mutex::new((Duration::ZERO, base)),
        })
    }

    /// Same as [`Fibonacci::new`], returned as a shared handle.
    pub fn arc(base: Duration) -> Result<Arc<Self>, BackoffError> {
        Self::new(base).map(Arc::new)
    }

    /// The scale factor of the sequence.
    pub fn base(&self) -> Duration {
        self.base
    }
}

impl Backoff for Fibonacci {
    fn next(&self) -> Option<Duration> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (prev, curr) = *state;
        match prev.checked_add(curr) {
            Some(next) => {
                *state = (curr, next);
                Some(next)
            }
            None => Some(Duration::MAX),
        }
    }

    fn reset(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = (Duration::ZERO, self.base);
    }
}
