use crate::error::{ErrorKind, Result};
use crate::export::{ExportedDocument, ExportedNode, ImageEntry};
use crate::{Node, NodeId, NodeKind};
use exn::ResultExt;
use std::collections::BTreeMap;

/// Arena of document nodes.
///
/// Node `n` always lives at index `n`. The root is a
/// [`NodeKind::Document`] node whose children are the pages.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    images: BTreeMap<String, ImageEntry>,
}

impl Document {
    /// Flattens a nested [`ExportedDocument`] into an arena.
    ///
    /// Ids are assigned in depth-first pre-order, starting with the root at 0.
    pub fn from_export(export: ExportedDocument) -> Result<Self> {
        let ExportedDocument { pages, images } = export;
        let root = NodeId(0);
        let mut nodes = vec![Node::new(root, NodeKind::Document, Some("Document".to_string()))];
        // Reverse so that pops come out in document order, which in turn means
        // each parent's `children` list is appended in its original order.
        let mut stack: Vec<(ExportedNode, NodeId)> = pages.into_iter().rev().map(|page| (page, root)).collect();
        while let Some((export, parent)) = stack.pop() {
            let id = u32::try_from(nodes.len())
                .map(NodeId)
                .or_raise(|| ErrorKind::InvalidDocument("too many nodes".to_string()))?;
            let ExportedNode { name, kind, fills, strokes, children } = export;
            nodes[parent.index()].children.push(id);
            nodes.push(Node {
                id,
                name,
                kind,
                fills,
                strokes,
                children: Vec::new(),
                parent: Some(parent),
            });
            stack.extend(children.into_iter().rev().map(|child| (child, id)));
        }
        Ok(Self { nodes, root, images })
    }

    /// Parses a JSON-encoded [`ExportedDocument`].
    pub fn from_json(json: &str) -> Result<Self> {
        let export: ExportedDocument =
            serde_json::from_str(json).map_err(|e| ErrorKind::InvalidDocument(e.to_string()))?;
        Self::from_export(export)
    }

    /// Builds a document from pre-linked nodes.
    ///
    /// Every node's id must equal its position. Links are *not* checked:
    /// dangling child or parent ids are accepted here and surface as
    /// [`ErrorKind::UnknownNode`] when something tries to follow them.
    pub fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Result<Self> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id.index() != index {
                exn::bail!(ErrorKind::InvalidDocument(format!("node {} stored at index {index}", node.id)));
            }
        }
        if root.index() >= nodes.len() {
            exn::bail!(ErrorKind::UnknownNode(root));
        }
        Ok(Self { nodes, root, images: BTreeMap::new() })
    }

    pub fn with_images(mut self, images: BTreeMap<String, ImageEntry>) -> Self {
        self.images = images;
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Top-level pages, in document order.
    pub fn pages(&self) -> &[NodeId] {
        self.node(self.root).map(|root| root.children.as_slice()).unwrap_or_default()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Image manifest (content hash to file location).
    pub fn images(&self) -> &BTreeMap<String, ImageEntry> {
        &self.images
    }

    /// The parent of `id`, or `None` at the root.
    pub fn parent(&self, id: NodeId) -> Result<Option<&Node>> {
        let node = self.node(id).ok_or(ErrorKind::UnknownNode(id))?;
        match node.parent {
            None => Ok(None),
            Some(parent) => Ok(Some(self.node(parent).ok_or(ErrorKind::UnknownNode(parent))?)),
        }
    }

    /// Walks from `id`'s parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            current: Some(id),
        }
    }

    /// Every node whose name is exactly `name`, in id order.
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.nodes.iter().filter(|node| node.name.as_deref() == Some(name)).map(|node| node.id).collect()
    }
}

/// Iterator returned by [`Document::ancestors`].
///
/// Stops after the first error.
pub struct Ancestors<'a> {
    document: &'a Document,
    current: Option<NodeId>,
}
impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        match self.document.parent(current) {
            Ok(Some(parent)) => {
                self.current = Some(parent.id);
                Some(Ok(parent))
            },
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Paint;

    fn sample() -> Document {
        Document::from_export(ExportedDocument::with_pages([
            ExportedNode::page("Page 1").child(
                ExportedNode::frame("Hero").children([
                    ExportedNode::rectangle("Background"),
                    ExportedNode::group("Card").child(ExportedNode::rectangle("Icon").fill(Paint::image("h1"))),
                ]),
            ),
            ExportedNode::page("Page 2"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_from_export_preorder_ids() {
        let document = sample();
        let names: Vec<_> = (0..document.len() as u32)
            .map(|i| document.node(NodeId(i)).unwrap().name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Document", "Page 1", "Hero", "Background", "Card", "Icon", "Page 2"]);
        assert_eq!(document.pages(), &[NodeId(1), NodeId(6)]);
        assert_eq!(document.node(NodeId(2)).unwrap().children, vec![NodeId(3), NodeId(4)]);
    }

    #[test]
    fn test_ancestors() {
        let document = sample();
        let icon = document.find_by_name("Icon")[0];
        let names: Vec<_> = document
            .ancestors(icon)
            .map(|node| node.unwrap().name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Card", "Hero", "Page 1", "Document"]);
    }

    #[test]
    fn test_ancestors_dangling_parent() {
        let mut orphan = Node::new(NodeId(1), NodeKind::Rectangle, Some("Orphan".to_string()));
        orphan.parent = Some(NodeId(99));
        let mut root = Node::new(NodeId(0), NodeKind::Document, None);
        root.children = vec![NodeId(1)];
        let document = Document::from_nodes(vec![root, orphan], NodeId(0)).unwrap();
        let mut ancestors = document.ancestors(NodeId(1));
        let err = ancestors.next().unwrap().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownNode(NodeId(99))));
        assert!(ancestors.next().is_none());
    }

    #[test]
    fn test_from_nodes_rejects_misplaced_ids() {
        let nodes = vec![Node::new(NodeId(3), NodeKind::Document, None)];
        assert!(matches!(&*Document::from_nodes(nodes, NodeId(3)).unwrap_err(), ErrorKind::InvalidDocument(_)));
    }

    #[test]
    fn test_from_json_invalid() {
        let err = Document::from_json("{\"pages\": 3}").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidDocument(_)));
    }
}
