//! Document Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::NodeId;
use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A document or host error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for document and host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No image is registered under this content hash.
    #[display("image not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// A node id (or a node's parent id) doesn't exist in the arena.
    #[display("unknown node: {_0}")]
    UnknownNode(#[error(not(source))] NodeId),
    /// The document couldn't be parsed or its structure is inconsistent.
    #[display("invalid document: {_0}")]
    InvalidDocument(#[error(not(source))] String),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The host bridge failed for a reason that may not happen again.
    #[display("host error: {_0}")]
    Host(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Host(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound("abc".to_string()).to_string(), "image not found: abc");
        assert_eq!(ErrorKind::UnknownNode(NodeId(4)).to_string(), "unknown node: 4");
        assert_eq!(ErrorKind::Host("bridge closed".to_string()).to_string(), "host error: bridge closed");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Host(String::new()).is_retryable());
        assert!(ErrorKind::Io(IoError::other("disk")).is_retryable());
        assert!(!ErrorKind::NotFound(String::new()).is_retryable());
        assert!(!ErrorKind::UnknownNode(NodeId(0)).is_retryable());
    }
}
