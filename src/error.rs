//! Error types used by backoff construction and the retry/repeat loops.
//!
//! This module defines:
//!
//! - [`BackoffError`] - rejected construction parameters (returned synchronously).
//! - [`AttemptError`] - what an operation reports from one attempt; the
//!   [`AttemptError::Retryable`] variant is the "may retry" marker.
//! - [`RetryError`] - terminal outcome of [`retry::run`](crate::retry::run).
//! - [`RepeatError`] - terminal outcome of [`repeat::run`](crate::repeat::run)
//!   and [`repeat::run_until_error`](crate::repeat::run_until_error).
//!
//! All enums provide `as_label` for logs/metrics. Terminal errors expose the
//! underlying cause through [`std::error::Error::source`] and `into_cause`, so
//! callers inspect the cause chain instead of matching strings.

use std::convert::Infallible;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced while constructing a backoff.
///
/// Construction never panics on bad input; the caller must check the result
/// before using the backoff.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackoffError {
    /// A base duration was zero.
    #[error("invalid {name}: must be greater than 0, got {value:?}")]
    InvalidParameter {
        /// Name of the rejected parameter.
        name: &'static str,
        /// The rejected value.
        value: Duration,
    },

    /// Jitter spread was zero.
    #[error("invalid jitter: must be a positive value, got {spread:?}")]
    InvalidJitter {
        /// The rejected spread.
        spread: Duration,
    },

    /// Jitter percentage was outside `1..=100`.
    #[error("invalid jitter percent: must be > 0 and <= 100, got {percent}")]
    InvalidJitterPercent {
        /// The rejected percentage.
        percent: u64,
    },
}

impl BackoffError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::BackoffError;
    ///
    /// let err = BackoffError::InvalidJitterPercent { percent: 101 };
    /// assert_eq!(err.as_label(), "backoff_invalid_jitter_percent");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BackoffError::InvalidParameter { .. } => "backoff_invalid_parameter",
            BackoffError::InvalidJitter { .. } => "backoff_invalid_jitter",
            BackoffError::InvalidJitterPercent { .. } => "backoff_invalid_jitter_percent",
        }
    }
}

/// # Outcome of a single failed attempt.
///
/// Operations passed to [`retry::run`](crate::retry::run) return
/// `Result<T, AttemptError<E>>`. Only [`AttemptError::Retryable`] lets the loop
/// consult the backoff; [`AttemptError::Fatal`] always halts immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError<E> {
    /// The attempt failed but may succeed if retried.
    #[error("retryable: {0}")]
    Retryable(#[source] E),

    /// The attempt failed and must not be retried.
    #[error("{0}")]
    Fatal(#[source] E),
}

impl<E> AttemptError<E> {
    /// Marks `err` as retryable.
    ///
    /// # Example
    /// ```
    /// use retryvisor::AttemptError;
    ///
    /// let err = AttemptError::retryable("connection reset");
    /// assert!(err.is_retryable());
    /// assert_eq!(err.to_string(), "retryable: connection reset");
    /// ```
    pub fn retryable(err: E) -> Self {
        AttemptError::Retryable(err)
    }

    /// Wraps `err` as a non-retryable failure.
    pub fn fatal(err: E) -> Self {
        AttemptError::Fatal(err)
    }

    /// Indicates whether the loop may try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::Retryable(_))
    }

    /// Borrows the wrapped cause.
    pub fn as_inner(&self) -> &E {
        match self {
            AttemptError::Retryable(e) | AttemptError::Fatal(e) => e,
        }
    }

    /// Unwraps the marker, returning the original cause.
    pub fn into_inner(self) -> E {
        match self {
            AttemptError::Retryable(e) | AttemptError::Fatal(e) => e,
        }
    }
}

/// # Terminal outcome of a retry loop.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A convenience wrapper could not build its backoff.
    #[error("failed to create backoff: {0}")]
    InvalidBackoff(#[from] BackoffError),

    /// The operation returned an error that was not marked retryable.
    #[error("function returned non retryable error: {0}")]
    NonRetryable(#[source] E),

    /// The backoff signaled stop; carries the last retryable cause.
    #[error("backoff signaled to stop: {0}")]
    BackoffExhausted(#[source] E),

    /// The cancellation token fired.
    #[error("operation cancelled")]
    Canceled,
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::InvalidBackoff(_) => "retry_invalid_backoff",
            RetryError::NonRetryable(_) => "retry_non_retryable",
            RetryError::BackoffExhausted(_) => "retry_backoff_exhausted",
            RetryError::Canceled => "retry_canceled",
        }
    }

    /// Returns `true` if the loop ended because of cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RetryError::Canceled)
    }

    /// Borrows the operation's error, if this outcome carries one.
    pub fn cause(&self) -> Option<&E> {
        match self {
            RetryError::NonRetryable(e) | RetryError::BackoffExhausted(e) => Some(e),
            RetryError::InvalidBackoff(_) | RetryError::Canceled => None,
        }
    }

    /// Consumes the outcome, returning the operation's error if present.
    pub fn into_cause(self) -> Option<E> {
        match self {
            RetryError::NonRetryable(e) | RetryError::BackoffExhausted(e) => Some(e),
            RetryError::InvalidBackoff(_) | RetryError::Canceled => None,
        }
    }
}

/// # Terminal outcome of a repeat loop.
///
/// The boolean form never carries a cause, so it uses the default
/// `E = Infallible`.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepeatError<E = Infallible> {
    /// A convenience wrapper could not build its backoff.
    #[error("failed to create backoff: {0}")]
    InvalidBackoff(#[from] BackoffError),

    /// The operation asked to stop (returned `false` or an error).
    #[error("function signaled to stop")]
    FunctionStopped(#[source] Option<E>),

    /// The backoff signaled stop.
    #[error("backoff signaled to stop")]
    BackoffExhausted,

    /// The cancellation token fired.
    #[error("operation cancelled")]
    Canceled,
}

impl<E> RepeatError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RepeatError::InvalidBackoff(_) => "repeat_invalid_backoff",
            RepeatError::FunctionStopped(_) => "repeat_function_stopped",
            RepeatError::BackoffExhausted => "repeat_backoff_exhausted",
            RepeatError::Canceled => "repeat_canceled",
        }
    }

    /// Returns `true` if the loop ended because of cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RepeatError::Canceled)
    }

    /// Borrows the operation's error, if the error form stopped the loop.
    pub fn cause(&self) -> Option<&E> {
        match self {
            RepeatError::FunctionStopped(e) => e.as_ref(),
            _ => None,
        }
    }

    /// Consumes the outcome, returning the operation's error if present.
    pub fn into_cause(self) -> Option<E> {
        match self {
            RepeatError::FunctionStopped(e) => e,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_retryable_display_prefix() {
        let err = AttemptError::retryable(io::Error::other("oops"));
        assert!(err.to_string().starts_with("retryable: "));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_fatal_is_not_retryable() {
        let err = AttemptError::fatal("nope");
        assert!(!err.is_retryable());
        assert_eq!(err.into_inner(), "nope");
    }

    #[test]
    fn test_retry_error_source_is_cause() {
        let err: RetryError<io::Error> =
            RetryError::BackoffExhausted(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        let source = err.source().expect("source");
        let io_err = source.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(err.as_label(), "retry_backoff_exhausted");
    }

    #[test]
    fn test_retry_error_from_backoff_error() {
        let err: RetryError<io::Error> = BackoffError::InvalidJitter {
            spread: Duration::ZERO,
        }
        .into();
        assert!(matches!(err, RetryError::InvalidBackoff(_)));
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_repeat_error_cause() {
        let err: RepeatError<io::Error> = RepeatError::FunctionStopped(Some(io::Error::other("x")));
        assert!(err.source().is_some());
        assert!(err.cause().is_some());

        let stopped: RepeatError = RepeatError::FunctionStopped(None);
        assert!(stopped.source().is_none());
        assert_eq!(stopped.as_label(), "repeat_function_stopped");
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(RetryError::<io::Error>::Canceled.as_label(), "retry_canceled");
        assert!(RepeatError::<Infallible>::Canceled.is_canceled());
        assert_eq!(
            BackoffError::InvalidParameter {
                name: "base",
                value: Duration::ZERO
            }
            .as_label(),
            "backoff_invalid_parameter"
        );
    }

    #[test]
    fn test_canceled_display_names_the_operation() {
        assert_eq!(RetryError::<io::Error>::Canceled.to_string(), "operation cancelled");
        assert_eq!(RepeatError::<Infallible>::Canceled.to_string(), "operation cancelled");
    }
}
