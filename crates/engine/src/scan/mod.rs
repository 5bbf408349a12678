//! Document traversal and image discovery.
//!
//! [`scan`] walks a node tree depth-first with an explicit stack, looking at
//! every node's fill and stroke paints. Each image paint's content hash is a
//! candidate; the first node seen referencing a given hash names it, and any
//! later references are ignored. Names are sanitized and made unique within
//! the result set, and each image is labelled with its nearest enclosing
//! frame, component or component set.

mod candidate;
pub mod error;
mod stream;

pub use self::candidate::PAGE_CONTAINER;
pub use self::stream::{SCAN_PHASE, scan};
use serde::{Deserialize, Serialize};

/// Which part of the document to scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanMode {
    /// Every page.
    #[default]
    All,
    /// Only the currently selected nodes (and their descendants).
    SelectionOnly,
}

/// A distinct image found in the document.
///
/// Immutable once discovered. Within one scan result no two entries share a
/// `hash` or a `display_name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredImage {
    /// Host content hash; the identity used for deduplication.
    #[serde(rename = "identity")]
    pub hash: String,
    pub display_name: String,
    pub container_name: String,
}

/// Periodic traversal progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanProgress {
    pub phase: &'static str,
    pub progress: u8,
    /// Nodes visited so far.
    pub current: usize,
    /// Nodes known about so far. Grows as containers are opened.
    pub total: usize,
}

/// Events emitted by [`scan`].
///
/// Zero or more [`Progress`](Self::Progress) events, then exactly one
/// [`Complete`](Self::Complete). A superseded or cancelled scan simply ends
/// without completing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    Progress(ScanProgress),
    /// The full, authoritative result set in first-seen order.
    Complete(Vec<DiscoveredImage>),
}
