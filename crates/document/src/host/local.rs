//! Filesystem-backed image host.
//!
//! Serves the images listed in a document's manifest, reading each file
//! relative to a root directory (normally the directory the document was
//! loaded from) via `tokio::fs`.

use crate::Document;
use crate::error::{ErrorKind, Result};
use crate::export::ImageEntry;
use crate::host::{Dimensions, HostImage, ImageHost};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Image host reading encoded bytes from local files.
///
/// # Examples
///
/// ```no_run
/// use imgrab_document::Document;
/// use imgrab_document::host::LocalHost;
///
/// # fn example(document: &Document) -> Result<(), Box<dyn std::error::Error>> {
/// let host = LocalHost::for_document("local", "/path/to/document/dir", document)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalHost {
    name: String,
    root: PathBuf,
    images: BTreeMap<String, ImageEntry>,
}
impl LocalHost {
    /// Create a host serving `images` from beneath `root`.
    ///
    /// Every manifest path is validated up front, so a manifest pointing
    /// outside `root` fails here rather than at fetch time.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>, images: BTreeMap<String, ImageEntry>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        let images = images
            .into_iter()
            .map(|(hash, entry)| -> Result<(String, ImageEntry)> {
                let path = validate_path(&entry.path)?;
                Ok((hash, ImageEntry { path, ..entry }))
            })
            .collect::<Result<_>>()?;
        Ok(Self { name: name.into(), root, images })
    }

    /// Create a host for the manifest carried by `document`.
    pub fn for_document(name: impl Into<String>, root: impl AsRef<Path>, document: &Document) -> Result<Self> {
        Self::new(name, root, document.images().clone())
    }

    fn entry(&self, image: &HostImage) -> Result<&ImageEntry> {
        Ok(self.images.get(&image.hash).ok_or_else(|| ErrorKind::NotFound(image.hash.clone()))?)
    }

    fn map_io_error(e: std::io::Error, hash: &str) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(hash.to_string()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl ImageHost for LocalHost {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, hash: &str) -> Result<Option<HostImage>> {
        Ok(self.images.contains_key(hash).then(|| HostImage::new(hash)))
    }

    async fn size(&self, image: &HostImage) -> Result<Dimensions> {
        let entry = self.entry(image)?;
        Ok(Dimensions::new(entry.width, entry.height))
    }

    async fn bytes(&self, image: &HostImage) -> Result<Vec<u8>> {
        let path = self.root.join(&self.entry(image)?.path);
        tracing::debug!(host = %self.name, hash = %image.hash, path = %path.display(), "Reading image bytes");
        Ok(fs::read(&path).await.map_err(|e| Self::map_io_error(e, &image.hash))?)
    }
}
