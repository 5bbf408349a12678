use crate::naming::{sanitize, unique_name};
use crate::operation::Operation;
use crate::scan::DiscoveredImage;
use crate::scan::error::{ErrorKind, Result};
use exn::ResultExt;
use imgrab_document::{Document, Node};
use std::collections::HashSet;

/// Container name used when no frame, component or component set encloses
/// an image before the page boundary.
pub const PAGE_CONTAINER: &str = "Page";

/// Working state of one scan. Owned exclusively by that scan and consumed
/// into the published result when it completes.
#[derive(Debug, Default)]
pub(crate) struct Candidates {
    images: Vec<DiscoveredImage>,
    hashes: HashSet<String>,
    names: HashSet<String>,
}

impl Candidates {
    /// Record `hash` as found on `node`, unless it's been seen already or the
    /// operation is no longer current.
    pub(crate) fn register(&mut self, document: &Document, node: &Node, hash: &str, operation: &Operation) {
        if !operation.is_active() || self.hashes.contains(hash) {
            return;
        }
        match self.describe(document, node) {
            Ok((display_name, container_name)) => {
                tracing::debug!(node = %node.id, hash, name = %display_name, container = %container_name, "Discovered image");
                self.names.insert(display_name.clone());
                self.hashes.insert(hash.to_string());
                self.images.push(DiscoveredImage {
                    hash: hash.to_string(),
                    display_name,
                    container_name,
                });
            },
            Err(err) => {
                tracing::warn!(node = %node.id, hash, error = ?err, "Skipping image that could not be named");
            },
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.images.len()
    }

    pub(crate) fn into_images(self) -> Vec<DiscoveredImage> {
        self.images
    }

    fn describe(&self, document: &Document, node: &Node) -> Result<(String, String)> {
        let base = sanitize(node.name.as_deref());
        let display_name = unique_name(&base, &self.names);
        let container_name = container_name(document, node)?;
        Ok((display_name, container_name))
    }
}

/// Sanitized name of the nearest named container above `node`, stopping at
/// the page.
fn container_name(document: &Document, node: &Node) -> Result<String> {
    for ancestor in document.ancestors(node.id) {
        let ancestor = ancestor.or_raise(|| ErrorKind::NameResolution)?;
        if ancestor.kind.is_page_boundary() {
            break;
        }
        if ancestor.kind.is_named_container() {
            return Ok(sanitize(ancestor.name.as_deref()));
        }
    }
    Ok(PAGE_CONTAINER.to_string())
}
