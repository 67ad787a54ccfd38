//! # retryvisor
//!
//! **Retryvisor** provides composable, concurrency-safe backoff sequences and
//! cancellable retry/repeat loops for tokio.
//!
//! A [`Backoff`] answers one question: how long to wait before the next attempt,
//! or whether to stop. Base generators produce a sequence; decorators wrap a
//! backoff to shape its values or cut it short; the loops in [`retry`] and
//! [`repeat`] drive an async operation with it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Constant   │   │ Exponential  │   │  Fibonacci   │   base generators
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Decorators (each wraps a BackoffRef)                             │
//! │  - Jitter / JitterPercent   (shape each value)                    │
//! │  - CappedDuration           (bound each value)                    │
//! │  - MaxRetries / MaxDuration (stop after N delays / after T)       │
//! │  - WithCancel               (stop when a token fires)             │
//! │  - WithReset                (rebuild the chain on reset)          │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼ &B: Backoff (shared by any number of loops)
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌──────────────┐                        ┌──────────────┐
//!     │  retry::run  │                        │ repeat::run  │
//!     │ until Ok/err │                        │ until stop   │
//!     └──────────────┘                        └──────────────┘
//! ```
//!
//! ### Loop
//! ```text
//! loop {
//!   ├─► token cancelled?         ─► Canceled
//!   ├─► op(child token).await    ─► done / terminal error / go again
//!   ├─► backoff.next() == None   ─► BackoffExhausted
//!   ├─► token cancelled?         ─► Canceled
//!   └─► select! { biased; token.cancelled() ─► Canceled, sleep(delay) ─► continue }
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Backoff**       | Stateful delay sequences safe to share across tasks/threads. | [`Backoff`], [`BackoffRef`], [`BackoffFn`]          |
//! | **Generators**    | Constant, exponential and Fibonacci sequences.               | [`Constant`], [`Exponential`], [`Fibonacci`]        |
//! | **Decorators**    | Jitter, caps, retry and time limits, cancellation.           | [`BackoffExt`], [`WithReset`], `with_*` functions   |
//! | **Loops**         | Cancellable retry and repeat executors.                      | [`retry::run`], [`repeat::run`]                     |
//! | **Errors**        | Typed construction and loop outcomes.                        | [`BackoffError`], [`RetryError`], [`RepeatError`]   |
//! | **Configuration** | Build a chain from plain data.                               | [`BackoffConfig`]                                   |
//!
//! ## Logging
//! The loops emit [`tracing`] events (`debug` for terminal outcomes, `trace` for each
//! scheduled wait). Install a subscriber in your binary to see them.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{AttemptError, BackoffExt, BackoffRef, Exponential, RetryError, retry};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = CancellationToken::new();
//!
//!     // 1ms, 2ms, 4ms, ... never longer than 10ms, at most 5 retries
//!     let base: BackoffRef = Exponential::arc(Duration::from_millis(1))?;
//!     let backoff = base
//!         .jitter_percent(10)?
//!         .capped_duration(Duration::from_millis(10))
//!         .max_retries(5);
//!
//!     let mut attempts = 0;
//!     let value = retry::run(&token, &backoff, |_attempt: CancellationToken| {
//!         attempts += 1;
//!         let n = attempts;
//!         async move {
//!             if n < 3 {
//!                 Err(AttemptError::retryable(std::io::Error::other("warming up")))
//!             } else {
//!                 Ok(n)
//!             }
//!         }
//!     })
//!     .await?;
//!
//!     assert_eq!(value, 3);
//!     Ok(())
//! }
//! ```

mod backoff;
mod config;
mod core;
mod error;
mod policies;
mod random;

pub mod repeat;
pub mod retry;

// ---- Public re-exports ----

pub use backoff::{Backoff, BackoffFn, BackoffRef, Constant, Exponential, Fibonacci};
pub use config::{BackoffConfig, BackoffKind};
pub use error::{AttemptError, BackoffError, RepeatError, RetryError};
pub use policies::{
    BackoffExt, CappedDuration, Jitter, JitterPercent, MaxDuration, MaxRetries, WithCancel,
    WithReset, with_cancel, with_capped_duration, with_jitter, with_jitter_percent,
    with_max_duration, with_max_retries, with_reset,
};
pub use random::{RandomRef, ThreadRandom, UniformRandom};
