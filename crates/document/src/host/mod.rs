//! Image host trait and implementations.
//!
//! The document tree only carries content hashes. Turning a hash into encoded
//! bytes (and pixel dimensions) is the host's job, and every call into it is
//! async: it may cross a process or network bridge.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalHost;
#[cfg(feature = "mock")]
pub use self::mock::MockHost;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type HostHandle = Arc<dyn ImageHost + Send + Sync>;

/// A resolved reference to an image asset held by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostImage {
    pub hash: String,
}
impl HostImage {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

/// Pixel dimensions of an image asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}
impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Retrieves image assets by content hash.
///
/// Mirrors the shape of a design tool's plugin API: resolving a hash is a
/// separate step from reading it, and size and bytes are fetched
/// independently.
///
/// # Examples
///
/// ```
/// use imgrab_document::host::ImageHost;
/// use imgrab_document::error::Result;
///
/// async fn byte_len(host: &dyn ImageHost, hash: &str) -> Result<Option<usize>> {
///     let Some(image) = host.resolve(hash).await? else {
///         return Ok(None);
///     };
///     Ok(Some(host.bytes(&image).await?.len()))
/// }
/// ```
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Name of the host, used for logging only.
    fn name(&self) -> &str;

    /// Look up an image by content hash.
    ///
    /// Returns `Ok(None)` when the host has no such image. Errors are reserved
    /// for the lookup itself failing.
    async fn resolve(&self, hash: &str) -> Result<Option<HostImage>>;

    /// Pixel dimensions of a resolved image.
    async fn size(&self, image: &HostImage) -> Result<Dimensions>;

    /// The image's original encoded bytes, untouched.
    async fn bytes(&self, image: &HostImage) -> Result<Vec<u8>>;
}
