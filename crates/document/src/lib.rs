//! The host side of a design document, as seen by the image scanner.
//!
//! A [`Document`] is an arena of [`Node`]s linked by id: children are listed
//! on their parent, and every node records its parent as a plain
//! [`NodeId`] lookup rather than a pointer. Nodes carry their fill and stroke
//! [`Paint`] lists, which is where image references live.
//!
//! Image bytes are not part of the tree. They're retrieved by content hash
//! through an [`ImageHost`](host::ImageHost), of which there is a local
//! filesystem implementation and (behind the `mock` feature) an in-memory one.

mod document;
pub mod error;
mod export;
pub mod host;
mod node;
mod paint;
mod path;

pub use crate::document::{Ancestors, Document};
pub use crate::export::{ExportedDocument, ExportedNode, ImageEntry};
pub use crate::host::{Dimensions, HostHandle, HostImage, ImageHost};
pub use crate::node::{Node, NodeId, NodeKind};
pub use crate::paint::Paint;
pub use crate::path::validate as validate_path;
