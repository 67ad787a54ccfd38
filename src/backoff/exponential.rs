//! # Exponential backoff.
//!
//! [`Exponential`] doubles the delay on every call: `base, 2·base, 4·base, …`.
//! The delay for attempt `n` (1-based) is `base × 2^(n-1)`, computed from a shared
//! atomic attempt counter so concurrent callers each consume a distinct term.
//!
//! The counter is advanced with a conditional atomic update that only succeeds
//! while the term fits in a [`Duration`]; past that point the counter stays put and
//! [`Duration::MAX`] is returned. The sequence never stops by itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::backoff::{Backoff, duration_from_nanos, ensure_positive};
use crate::error::BackoffError;

/// Exponential backoff. Safe for concurrent use.
#[derive(Debug)]
pub struct Exponential {
    base: Duration,
    attempt: AtomicU64,
}

impl Exponential {
    /// Creates an exponential backoff starting at `base`. Fails if `base` is zero.
    pub fn new(base: Duration) -> Result<Self, BackoffError> {
        ensure_positive("exponential backoff base", base)?;
        Ok(Self {
            base,
            attempt: AtomicU64::new(0),
        })
    }

    /// Same as [`Exponential::new`], returned as a shared handle.
    pub fn arc(base: Duration) -> Result<Arc<Self>, BackoffError> {
        Self::new(base).map(Arc::new)
    }

    /// The first delay of the sequence.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// `base << shift`, or `None` on overflow.
    fn scaled(&self, shift: u64) -> Option<Duration> {
        let shift = u32::try_from(shift).ok()?;
        let factor = 1u128.checked_shl(shift)?;
        let nanos = self.base.as_nanos().checked_mul(factor)?;
        duration_from_nanos(nanos)
    }
}

impl Backoff for Exponential {
    fn next(&self) -> Option<Duration> {
        // the counter only advances while the term still fits
        match self
            .attempt
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |a| {
                self.scaled(a).map(|_| a + 1)
            }) {
            Ok(prev) => Some(self.scaled(prev).unwrap_or(Duration::MAX)),
            Err(_) => Some(Duration::MAX),
        }
    }

    fn reset(&self) {
        self.attempt.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_zero_base_rejected() {
        assert!(matches!(
            Exponential::new(Duration::ZERO),
            Err(BackoffError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_doubles_each_call() {
        let cases = [
            (
                Duration::from_nanos(1),
                vec![1u64, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192],
            ),
            (
                Duration::from_secs(1),
                vec![1_000_000_000, 2_000_000_000, 4_000_000_000, 8_000_000_000],
            ),
        ];

        for (base, want) in cases {
            let b = Exponential::new(base).unwrap();
            let got: Vec<u64> = (0..want.len())
                .map(|_| b.next().unwrap().as_nanos() as u64)
                .collect();
            assert_eq!(got, want, "base {base:?}");
        }
    }

    #[test]
    fn test_saturates_without_stopping() {
        let b = Exponential::new(Duration::from_secs(1)).unwrap();
        let mut last = Duration::ZERO;
        for _ in 0..200 {
            last = b.next().expect("never stops");
        }
        assert_eq!(last, Duration::MAX);

        // counter stops advancing, so it keeps answering MAX
        assert_eq!(b.next(), Some(Duration::MAX));
        assert!(b.attempt.load(Ordering::Acquire) < 200);
    }

    #[test]
    fn test_reset_restores_sequence() {
        let b = Exponential::new(Duration::from_millis(3)).unwrap();
        let first: Vec<_> = (0..10).map(|_| b.next()).collect();
        b.reset();
        let second: Vec<_> = (0..10).map(|_| b.next()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_callers_see_distinct_terms() {
        const CALLERS: usize = 64;

        let b = Exponential::new(Duration::from_nanos(1)).unwrap();
        let seen: Vec<Duration> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..CALLERS)
                .map(|_| s.spawn(|| b.next().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let got: BTreeSet<u128> = seen.iter().map(Duration::as_nanos).collect();
        let want: BTreeSet<u128> = (0..CALLERS as u32).map(|i| 1u128 << i).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn test_reset_racing_saturated_next() {
        let b = Exponential::new(Duration::from_secs(1)).unwrap();

        for _ in 0..50 {
            std::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        for _ in 0..2000 {
                            assert!(b.next().is_some());
                        }
                    });
                }
                s.spawn(|| {
                    for _ in 0..2000 {
                        b.reset();
                    }
                });
            });

            // counter never wraps past the last term that fits
            assert!(b.attempt.load(Ordering::Acquire) < 128);
            b.reset();
            assert_eq!(b.next(), Some(Duration::from_secs(1)));
            assert_eq!(b.next(), Some(Duration::from_secs(2)));
            b.reset();
        }
    }
}
