//! # Constant backoff.
//!
//! [`Constant`] returns the same delay on every call and never stops by itself.

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{Backoff, ensure_positive};
use crate::error::BackoffError;

/// Constant backoff: every call returns the same delay.
///
/// Holds no mutable state, so [`Backoff::reset`] does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constant {
    base: Duration,
}

impl Constant {
    /// Creates a constant backoff. Fails if `base` is zero.
    pub fn new(base: Duration) -> Result<Self, BackoffError> {
        ensure_positive("constant backoff", base)?;
        Ok(Self { base })
    }

    /// Same as [`Constant::new`], returned as a shared handle.
    pub fn arc(base: Duration) -> Result<Arc<Self>, BackoffError> {
        Self::new(base).map(Arc::new)
    }

    /// The delay returned on every call.
    pub fn base(&self) -> Duration {
        self.base
    }
}

impl Backoff for Constant {
    fn next(&self) -> Option<Duration> {
        Some(self.base)
    }

    fn reset(&self) {}
}
