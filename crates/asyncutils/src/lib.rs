//! Cooperative scheduling helpers that don't care which executor drives them.
//!
//! Nothing in here spawns, sleeps or preempts. Long-running work built on
//! these primitives only gives up control (or notices it should stop) at the
//! points where it explicitly asks to.

mod cancellable;
mod yield_now;

pub use crate::cancellable::{Cancellable, CancellableExt, Cancelled, CancellationSignal};
pub use crate::yield_now::{YieldNow, yield_now};
