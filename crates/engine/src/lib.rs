//! Finds every distinct raster image embedded in a design document, and
//! fetches their original encoded bytes.
//!
//! The pipeline has two long-running halves, both exposed as streams of
//! events so a caller can forward progress as it happens:
//!
//! - [`scan()`] walks the node tree and yields a deduplicated list of
//!   [`DiscoveredImage`]s.
//! - [`fetch()`] retrieves a list of discovered images from the
//!   [`ImageHost`](imgrab_document::ImageHost) in batches, retrying failed
//!   items and yielding them as they arrive.
//!
//! Both take an [`Operation`]: starting a new one (or cancelling) makes any
//! older operation notice, at its next check, that it should stop. The
//! [`Session`] ties it all together behind the [`protocol`] message types.

pub mod error;
pub mod eta;
pub mod fetch;
pub mod naming;
pub mod operation;
pub mod protocol;
pub mod scan;
mod session;

pub use crate::fetch::{FetchEvent, FetchRequest, FetchedImage, fetch};
pub use crate::operation::{Operation, OperationToken, Operations};
pub use crate::scan::{DiscoveredImage, ScanEvent, ScanMode, scan};
pub use crate::session::{NO_SELECTION_MESSAGE, Session};
