//! # Cancellation-aware backoff.
//!
//! [`WithCancel`] ends the inner sequence once its [`CancellationToken`] fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backoff::{Backoff, BackoffRef};
use crate::policies::reset::Decorator;

/// Stops the sequence once `token` is cancelled.
///
/// Only ends the backoff sequence; the retry and repeat loops check their own
/// token independently.
pub struct WithCancel {
    token: CancellationToken,
    inner: BackoffRef,
}

impl WithCancel {
    /// Wraps `inner`, stopping when `token` fires.
    pub fn new(token: CancellationToken, inner: BackoffRef) -> Self {
        Self { token, inner }
    }
}

impl Backoff for WithCancel {
    fn next(&self) -> Option<Duration> {
        if self.token.is_cancelled() {
            return None;
        }
        self.inner.next()
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

impl Decorator for WithCancel {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self::new(self.token.clone(), self.inner.clone())
    }
}
