//! # Declarative backoff configuration.
//!
//! [`BackoffConfig`] describes a whole backoff chain as plain data: the base
//! generator plus optional jitter, cap, retry limit and time limit. Zero values
//! mean "disabled", so a config can be filled from flags or a file and built
//! with [`BackoffConfig::build`].
//!
//! ```text
//! kind(base) ─► jitter ─► jitter_percent ─► cap ─► max_retries ─► max_duration
//! ```
//!
//! Every layer is created with the resettable `with_*` constructors, so calling
//! `reset()` on the built backoff restores the whole chain.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use retryvisor::{Backoff, BackoffConfig, BackoffKind};
//!
//! let mut cfg = BackoffConfig::default();
//! cfg.kind = BackoffKind::Fibonacci;
//! cfg.base = Duration::from_secs(1);
//! cfg.cap = Duration::from_secs(5);
//! cfg.max_retries = Some(6);
//!
//! let b = cfg.build().unwrap();
//! let got: Vec<_> = std::iter::from_fn(|| b.next()).collect();
//! assert_eq!(got, [1, 2, 3, 5, 5, 5].map(Duration::from_secs));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{BackoffRef, Constant, Exponential, Fibonacci};
use crate::error::BackoffError;
use crate::policies::{
    with_capped_duration, with_jitter, with_jitter_percent, with_max_duration, with_max_retries,
};

/// Base generator selected by [`BackoffConfig::kind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackoffKind {
    /// Always `base`.
    Constant,
    /// `base * 2^n`.
    #[default]
    Exponential,
    /// `base` scaled by the Fibonacci sequence.
    Fibonacci,
}

/// Plain-data description of a backoff chain.
#[derive(Clone, Debug)]
pub struct BackoffConfig {
    /// Base generator.
    pub kind: BackoffKind,
    /// First delay of the base generator (must be > 0).
    pub base: Duration,
    /// Absolute jitter spread (0 = no jitter).
    pub jitter: Duration,
    /// Relative jitter in percent, 1..=100 (0 = no jitter).
    pub jitter_percent: u64,
    /// Retry limit (`None` = unlimited).
    pub max_retries: Option<u64>,
    /// Upper bound for each delay (0 = uncapped).
    pub cap: Duration,
    /// Total time budget (0 = unlimited).
    pub max_duration: Duration,
}

impl Default for BackoffConfig {
    /// Provides a default configuration:
    /// - `kind = Exponential`
    /// - `base = 100ms`
    /// - no jitter, no cap, no retry limit, no time limit
    fn default() -> Self {
        Self {
            kind: BackoffKind::default(),
            base: Duration::from_millis(100),
            jitter: Duration::ZERO,
            jitter_percent: 0,
            max_retries: None,
            cap: Duration::ZERO,
            max_duration: Duration::ZERO,
        }
    }
}

impl BackoffConfig {
    /// Returns the jitter spread, or `None` if disabled.
    #[inline]
    pub fn jitter(&self) -> Option<Duration> {
        (!self.jitter.is_zero()).then_some(self.jitter)
    }

    /// Returns the jitter percentage, or `None` if disabled.
    #[inline]
    pub fn jitter_percent(&self) -> Option<u64> {
        (self.jitter_percent != 0).then_some(self.jitter_percent)
    }

    /// Returns the per-delay cap, or `None` if uncapped.
    #[inline]
    pub fn cap(&self) -> Option<Duration> {
        (!self.cap.is_zero()).then_some(self.cap)
    }

    /// Returns the total time budget, or `None` if unlimited.
    #[inline]
    pub fn max_duration(&self) -> Option<Duration> {
        (!self.max_duration.is_zero()).then_some(self.max_duration)
    }

    /// Builds the configured chain.
    ///
    /// Fails if `base` is zero or `jitter_percent` exceeds 100. The time budget of
    /// `max_duration` starts counting when this is called.
    pub fn build(&self) -> Result<BackoffRef, BackoffError> {
        let mut b: BackoffRef = match self.kind {
            BackoffKind::Constant => Constant::arc(self.base)?,
            BackoffKind::Exponential => Exponential::arc(self.base)?,
            BackoffKind::Fibonacci => Fibonacci::arc(self.base)?,
        };

        if let Some(spread) = self.jitter() {
            b = Arc::new(with_jitter(spread, b)?);
        }
        if let Some(percent) = self.jitter_percent() {
            b = Arc::new(with_jitter_percent(percent, b)?);
        }
        if let Some(cap) = self.cap() {
            b = Arc::new(with_capped_duration(cap, b));
        }
        if let Some(max) = self.max_retries {
            b = Arc::new(with_max_retries(max, b));
        }
        if let Some(timeout) = self.max_duration() {
            b = Arc::new(with_max_duration(timeout, b));
        }
        Ok(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::Backoff;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_default_is_plain_exponential() {
        let cfg = BackoffConfig::default();
        assert_eq!(cfg.kind, BackoffKind::Exponential);
        assert_eq!(cfg.jitter(), None);
        assert_eq!(cfg.jitter_percent(), None);
        assert_eq!(cfg.cap(), None);
        assert_eq!(cfg.max_duration(), None);

        let b = cfg.build().unwrap();
        let got: Vec<_> = (0..4).map(|_| b.next().unwrap()).collect();
        assert_eq!(got, [ms(100), ms(200), ms(400), ms(800)]);
    }

    #[test]
    fn test_zero_base_rejected() {
        let cfg = BackoffConfig {
            base: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            cfg.build(),
            Err(BackoffError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_invalid_jitter_percent_rejected() {
        let cfg = BackoffConfig {
            jitter_percent: 101,
            ..Default::default()
        };
        assert!(matches!(
            cfg.build(),
            Err(BackoffError::InvalidJitterPercent { percent: 101 })
        ));
    }

    #[test]
    fn test_cap_and_retries_reset_together() {
        let cfg = BackoffConfig {
            kind: BackoffKind::Constant,
            base: ms(50),
            cap: ms(20),
            max_retries: Some(2),
            ..Default::default()
        };
        let b = cfg.build().unwrap();

        for _ in 0..2 {
            assert_eq!(b.next(), Some(ms(20)));
            assert_eq!(b.next(), Some(ms(20)));
            assert_eq!(b.next(), None);
            b.reset();
        }
    }

    #[test]
    fn test_jitter_stays_within_cap() {
        let cfg = BackoffConfig {
            base: ms(100),
            jitter: ms(50),
            jitter_percent: 10,
            cap: ms(300),
            max_retries: Some(50),
            ..Default::default()
        };
        let b = cfg.build().unwrap();
        let got: Vec<_> = std::iter::from_fn(|| b.next()).collect();

        assert_eq!(got.len(), 50);
        assert!(got.iter().all(|d| *d <= ms(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_duration_applied_last() {
        let cfg = BackoffConfig {
            kind: BackoffKind::Constant,
            base: Duration::from_secs(10),
            max_duration: Duration::from_secs(1),
            ..Default::default()
        };
        let b = cfg.build().unwrap();

        assert_eq!(b.next(), Some(Duration::from_secs(1)));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(b.next(), None);

        b.reset();
        assert_eq!(b.next(), Some(Duration::from_secs(1)));
    }
}
