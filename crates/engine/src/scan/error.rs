//! Error types for the [`scan`](super) module.

use derive_more::{Display, Error};

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A selection-only scan was requested with nothing selected. The user
    /// has to fix this; nothing else will.
    #[display("nothing is selected")]
    NoSelection,
    /// Walking the tree to name a candidate image failed. Never escapes a
    /// scan: the candidate is logged and dropped.
    #[display("could not resolve a name for the image")]
    NameResolution,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
