//! Nested, serializable description of a document.
//!
//! This is the shape documents take on disk (and the easiest shape to write by
//! hand in tests). [`Document::from_export`](crate::Document::from_export)
//! flattens it into the arena.

use crate::{NodeKind, Paint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A whole document: its pages, plus a manifest of where each image's
/// encoded bytes live (keyed by content hash).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedDocument {
    #[serde(default)]
    pub pages: Vec<ExportedNode>,
    #[serde(default)]
    pub images: BTreeMap<String, ImageEntry>,
}

/// Manifest entry for one image asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Relative to the document's directory.
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// A node and (recursively) its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub children: Vec<ExportedNode>,
}
impl ExportedNode {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            fills: Vec::new(),
            strokes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn page(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Page, name)
    }

    pub fn frame(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Frame, name)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Group, name)
    }

    pub fn rectangle(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Rectangle, name)
    }

    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn fill(mut self, paint: Paint) -> Self {
        self.fills.push(paint);
        self
    }

    pub fn stroke(mut self, paint: Paint) -> Self {
        self.strokes.push(paint);
        self
    }

    pub fn child(mut self, child: ExportedNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ExportedNode>) -> Self {
        self.children.extend(children);
        self
    }
}
impl ExportedDocument {
    pub fn with_pages(pages: impl IntoIterator<Item = ExportedNode>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            images: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
            "pages": [{
                "name": "Page 1",
                "type": "PAGE",
                "children": [{
                    "name": "Hero",
                    "type": "FRAME",
                    "fills": [{"type": "IMAGE", "imageHash": "h1"}]
                }]
            }],
            "images": {"h1": {"path": "img/h1.png", "width": 64, "height": 32}}
        }"#;
        let export: ExportedDocument = serde_json::from_str(json).unwrap();
        assert_eq!(export.pages.len(), 1);
        let hero = &export.pages[0].children[0];
        assert_eq!(hero.kind, NodeKind::Frame);
        assert_eq!(hero.fills, vec![Paint::image("h1")]);
        assert_eq!(export.images["h1"].width, 64);
    }

    #[test]
    fn test_builder() {
        let export = ExportedNode::frame("Hero").child(ExportedNode::rectangle("Icon").fill(Paint::image("h1")).unnamed());
        assert_eq!(export.children.len(), 1);
        assert_eq!(export.children[0].name, None);
        assert_eq!(export.children[0].fills.len(), 1);
    }
}
