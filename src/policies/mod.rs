//! Backoff decorators.
//!
//! Each decorator wraps an inner [`BackoffRef`](crate::BackoffRef) and changes
//! **what** delay it yields or **when** the sequence stops.
//!
//! ## Contents
//! - [`Jitter`]         adds a uniform offset in `[-spread, +spread]`
//! - [`JitterPercent`]  scales each delay by a random factor in `[100-p, 100+p]%`
//! - [`MaxRetries`]     stops after a fixed number of delays
//! - [`CappedDuration`] clamps each delay to an upper bound
//! - [`MaxDuration`]    stops once a total time budget has elapsed
//! - [`WithCancel`]     stops once a cancellation token fires
//! - [`WithReset`]      swaps in a freshly built chain on every reset
//!
//! ## Quick wiring
//! ```text
//! Exponential ─► with_jitter ─► with_capped_duration ─► with_max_retries
//!                    │                  │                      │
//!                    └──────────────────┴──────── reset() ─────┘
//!                         each layer rebuilds itself and resets what it wraps
//! ```
//!
//! The `with_*` constructors return decorators already wrapped in [`WithReset`],
//! so calling `reset()` on the outermost layer restores the whole chain.
//! [`BackoffExt`] offers the same constructors in method form.

mod cancel;
mod capped;
mod jitter;
mod max_duration;
mod max_retries;
mod reset;

pub use cancel::WithCancel;
pub use capped::CappedDuration;
pub use jitter::{Jitter, JitterPercent};
pub use max_duration::MaxDuration;
pub use max_retries::MaxRetries;
pub use reset::{
    BackoffExt, WithReset, with_cancel, with_capped_duration, with_jitter, with_jitter_percent,
    with_max_duration, with_max_retries, with_reset,
};
