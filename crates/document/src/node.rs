use crate::Paint;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Index of a node within its [`Document`](crate::Document) arena.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(pub u32);
impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kinds of node a design document is built from.
///
/// Anything the host reports that isn't listed here deserializes as
/// [`Other`](Self::Other); it is still walked, just never treated as a
/// named container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Page,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Section,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Vector,
    Line,
    Text,
    BooleanOperation,
    #[default]
    #[serde(other)]
    Other,
}
impl NodeKind {
    /// Frames, components and component sets: the containers whose names are
    /// used to describe where an image was found.
    pub fn is_named_container(&self) -> bool {
        matches!(self, NodeKind::Frame | NodeKind::Component | NodeKind::ComponentSet)
    }

    /// Ancestor walks stop here.
    pub fn is_page_boundary(&self) -> bool {
        matches!(self, NodeKind::Page | NodeKind::Document)
    }
}

/// A single node in the document arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}
impl Node {
    pub fn new(id: NodeId, kind: NodeKind, name: impl Into<Option<String>>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            fills: Vec::new(),
            strokes: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Fills first, then strokes.
    pub fn paints(&self) -> impl Iterator<Item = &Paint> {
        self.fills.iter().chain(self.strokes.iter())
    }

    /// Content hashes of every image paint on this node, in paint order.
    ///
    /// Image paints without a hash (still uploading, or broken) are skipped.
    pub fn image_hashes(&self) -> impl Iterator<Item = &str> {
        self.paints().filter_map(Paint::image_hash)
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }
}
