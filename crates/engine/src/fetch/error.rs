//! Error types for the [`fetch`](super) module.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a fetch (or a single item within one) failed.
///
/// ### Operation-level
/// - [`ErrorKind::Cancelled`]: the operation was superseded or cancelled
///   after some batches may already have been delivered.
///
/// ### Per item
/// These are retried up to the attempt ceiling, then contained within the
/// fetch and only surfaced as a count.
/// - [`ErrorKind::ImageNotFound`]
/// - [`ErrorKind::ImageTooLarge`]
/// - [`ErrorKind::Host`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("operation cancelled")]
    Cancelled,
    /// The host has no image under this content hash.
    #[display("image not found: {_0}")]
    ImageNotFound(#[error(not(source))] String),
    /// The encoded image is bigger than the configured ceiling.
    #[display("image is {size} bytes, over the {limit} byte limit")]
    ImageTooLarge { size: u64, limit: u64 },
    /// The host bridge failed while resolving or reading the image.
    #[display("host request failed")]
    Host,
}

impl ErrorKind {
    /// Returns `true` if the item should get another attempt.
    ///
    /// Every per-item failure is retried up to the attempt ceiling. Only
    /// cancellation stops an item early.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorKind::Cancelled)
    }
}
