//! Loop internals shared by [`retry`](crate::retry) and [`repeat`](crate::repeat).
//!
//! Internal modules:
//! - [`runner`]: asks the backoff for a delay and waits it out, observing cancellation.

pub(crate) mod runner;
