//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each pipeline stage has its own
//! error module ([`scan::error`](crate::scan::error),
//! [`fetch::error`](crate::fetch::error)); failures crossing into the
//! [`Session`](crate::Session) are raised into the kinds below.

use derive_more::{Display, Error};

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("scanning the document failed")]
    Scan,
    #[display("downloading images failed")]
    Fetch,
    /// A message from the presentation layer couldn't be understood.
    #[display("invalid message: {_0}")]
    Protocol(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
