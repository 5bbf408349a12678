//! Newest-request-wins operation tracking.
//!
//! There is exactly one current operation at a time. Starting another one
//! supersedes it immediately, and [`Operations::cancel`] marks it cancelled
//! without replacing it. Nothing is preempted: scans and fetches poll
//! [`Operation::is_active`] at every loop head and suspension point and wind
//! themselves down when it turns false.

use derive_more::Display;
use imgrab_asyncutils::CancellationSignal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use time::UtcDateTime;

/// Opaque identifier of one scan or fetch.
///
/// Derived from the wall clock, but bumped so that a token issued later is
/// always greater than any issued before it. Tokens are compared for
/// equality with the current one, never ordered.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct OperationToken(u64);

// The top bit of `Operations::state` marks the current token cancelled.
const CANCELLED: u64 = 1 << 63;
const TOKEN_MASK: u64 = !CANCELLED;

/// Registry holding the current operation token.
#[derive(Debug, Default)]
pub struct Operations {
    // Token and cancelled flag share one word so both change in a single
    // atomic step. A zero token means nothing has started yet.
    state: AtomicU64,
}

impl Operations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Issue a new token, making it current and clearing any cancellation.
    pub fn start(&self) -> OperationToken {
        let now = u64::try_from(UtcDateTime::now().unix_timestamp_nanos()).unwrap_or(0) & TOKEN_MASK;
        let next = |state: u64| now.max((state & TOKEN_MASK).saturating_add(1)) & TOKEN_MASK;
        let previous = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| Some(next(state)))
            // Infallible: the closure always returns `Some`.
            .unwrap_or_else(|state| state);
        let token = OperationToken(next(previous));
        tracing::debug!(%token, "Operation started");
        token
    }

    /// Start a new operation and bundle its token with this registry.
    pub fn begin(self: &Arc<Self>) -> Operation {
        Operation {
            registry: Arc::clone(self),
            token: self.start(),
        }
    }

    /// Mark the current operation cancelled. Its token stays current.
    pub fn cancel(&self) {
        let previous = self.state.fetch_or(CANCELLED, Ordering::SeqCst);
        if previous & CANCELLED == 0 {
            tracing::debug!(token = previous & TOKEN_MASK, "Operation cancelled");
        }
    }

    /// `true` iff `token` is the current token and it hasn't been cancelled.
    pub fn is_active(&self, token: OperationToken) -> bool {
        self.state.load(Ordering::SeqCst) == token.0
    }

    pub fn current(&self) -> Option<OperationToken> {
        match self.state.load(Ordering::SeqCst) & TOKEN_MASK {
            0 => None,
            token => Some(OperationToken(token)),
        }
    }
}

/// A token together with the registry that issued it.
///
/// This is the context handed by reference to every long-running call.
#[derive(Clone, Debug)]
pub struct Operation {
    registry: Arc<Operations>,
    token: OperationToken,
}
impl Operation {
    pub fn token(&self) -> OperationToken {
        self.token
    }

    pub fn is_active(&self) -> bool {
        self.registry.is_active(self.token)
    }
}
impl CancellationSignal for Operation {
    fn is_cancelled(&self) -> bool {
        !self.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_current_initially() {
        let operations = Operations::default();
        assert_eq!(operations.current(), None);
    }

    #[test]
    fn test_start_supersedes_previous() {
        let operations = Operations::default();
        let first = operations.start();
        assert!(operations.is_active(first));
        let second = operations.start();
        assert!(!operations.is_active(first));
        assert!(operations.is_active(second));
        assert_eq!(operations.current(), Some(second));
    }

    #[test]
    fn test_tokens_strictly_increase() {
        let operations = Operations::default();
        let tokens: Vec<_> = (0..100).map(|_| operations.start()).collect();
        assert!(tokens.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_cancel_keeps_identity() {
        let operations = Operations::default();
        let token = operations.start();
        operations.cancel();
        assert!(!operations.is_active(token));
        assert_eq!(operations.current(), Some(token));
        // A fresh start clears the flag.
        let next = operations.start();
        assert!(operations.is_active(next));
    }

    #[test]
    fn test_cancel_before_any_start() {
        let operations = Operations::default();
        operations.cancel();
        assert_eq!(operations.current(), None);
        let token = operations.start();
        assert!(operations.is_active(token));
    }

    #[test]
    fn test_start_racing_cancel() {
        let operations = Operations::new();
        for _ in 0..200 {
            let canceller = {
                let operations = Arc::clone(&operations);
                std::thread::spawn(move || operations.cancel())
            };
            let token = operations.start();
            canceller.join().unwrap();
            assert_eq!(operations.current(), Some(token));
            // Once the cancel has landed, the token reads as cancelled however
            // the two interleaved.
            operations.cancel();
            assert!(!operations.is_active(token));
            let next = operations.start();
            assert!(operations.is_active(next));
        }
    }

    #[test]
    fn test_operation_signal() {
        let operations = Operations::new();
        let operation = operations.begin();
        assert!(operation.is_active());
        assert!(!operation.is_cancelled());
        let _newer = operations.begin();
        assert!(!operation.is_active());
        assert!(operation.is_cancelled());
    }
}
