//! # Jitter decorators.
//!
//! Jitter adds randomness to backoff delays to prevent thundering herd effects
//! when many callers retry at the same moment.
//!
//! - [`Jitter`] - adds a uniform offset in `[-spread, +spread]`
//! - [`JitterPercent`] - scales by a uniform factor in `[1 - p/100, 1 + p/100]`
//!
//! Both clamp at zero, propagate the inner stop signal untouched, and draw from an
//! injectable [`UniformRandom`] source ([`ThreadRandom`](crate::ThreadRandom) by default).

use std::time::Duration;

use crate::backoff::{Backoff, BackoffRef, duration_from_nanos};
use crate::error::BackoffError;
use crate::policies::reset::Decorator;
use crate::random::{RandomRef, UniformRandom, default_random};

/// Largest spread (in nanoseconds) for which `2 × spread + 1` still fits a `u64`.
const MAX_SPREAD_NANOS: u64 = (u64::MAX - 1) / 2;

/// Additive jitter: `inner ± spread`, clamped to zero.
///
/// With `spread = 5s` and an inner value of `20s`, the result lies in `[15s, 25s]`.
pub struct Jitter {
    spread: Duration,
    inner: BackoffRef,
    random: RandomRef,
}

impl Jitter {
    /// Wraps `inner`. Fails with [`BackoffError::InvalidJitter`] if `spread` is zero.
    pub fn new(spread: Duration, inner: BackoffRef) -> Result<Self, BackoffError> {
        if spread.is_zero() {
            return Err(BackoffError::InvalidJitter { spread });
        }
        Ok(Self {
            spread,
            inner,
            random: default_random(),
        })
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_random(mut self, random: RandomRef) -> Self {
        self.random = random;
        self
    }

    fn spread_nanos(&self) -> u64 {
        u64::try_from(self.spread.as_nanos())
            .unwrap_or(MAX_SPREAD_NANOS)
            .min(MAX_SPREAD_NANOS)
    }
}

impl Backoff for Jitter {
    fn next(&self) -> Option<Duration> {
        let val = self.inner.next()?;

        let spread = self.spread_nanos();
        let draw = self.random.below(spread * 2 + 1);
        let jittered = if draw >= spread {
            val.saturating_add(Duration::from_nanos(draw - spread))
        } else {
            val.saturating_sub(Duration::from_nanos(spread - draw))
        };
        Some(jittered)
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

impl Decorator for Jitter {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self {
            spread: self.spread,
            inner: self.inner.clone(),
            random: self.random.clone(),
        }
    }
}

/// Proportional jitter: `inner × (1 ± pct/100)`, clamped to zero.
///
/// With `pct = 5` and an inner value of `20s`, the result lies in `[19s, 21s]`.
pub struct JitterPercent {
    percent: u64,
    inner: BackoffRef,
    random: RandomRef,
}

impl JitterPercent {
    /// Wraps `inner`. Fails with [`BackoffError::InvalidJitterPercent`] unless
    /// `0 < percent <= 100`.
    pub fn new(percent: u64, inner: BackoffRef) -> Result<Self, BackoffError> {
        if percent == 0 || percent > 100 {
            return Err(BackoffError::InvalidJitterPercent { percent });
        }
        Ok(Self {
            percent,
            inner,
            random: default_random(),
        })
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_random(mut self, random: RandomRef) -> Self {
        self.random = random;
        self
    }
}

impl Backoff for JitterPercent {
    fn next(&self) -> Option<Duration> {
        let val = self.inner.next()?;

        // multiplier in [100 - percent, 100 + percent], applied in whole nanoseconds
        let draw = self.random.below(self.percent * 2 + 1);
        let multiplier = u128::from(100 - self.percent + draw);
        let nanos = val.as_nanos() * multiplier / 100;
        Some(duration_from_nanos(nanos).unwrap_or(Duration::MAX))
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

impl Decorator for JitterPercent {
    fn rebuild(&self) -> Self {
        self.inner.reset();
        Self {
            percent: self.percent,
            inner: self.inner.clone(),
            random: self.random.clone(),
        }
    }
}
