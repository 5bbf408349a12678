//! In-memory image host for testing.

use crate::error::{ErrorKind, Result};
use crate::host::{Dimensions, HostImage, ImageHost};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory image host for testing.
///
/// Images live in a `HashMap` behind a [`Mutex`], so every trait method works
/// on `&self`. Locks are never held across an `.await`. Transient failures
/// can be scheduled per hash with [`fail_next`](Self::fail_next), and reads
/// are counted so tests can assert on retry behaviour.
///
/// # Examples
///
/// ```
/// use imgrab_document::host::{HostImage, ImageHost, MockHost};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let host = MockHost::with_images([("h1", b"GIF89a...".to_vec())]);
/// host.fail_next("h1", 1);
/// assert!(host.bytes(&HostImage::new("h1")).await.is_err());
/// assert!(host.bytes(&HostImage::new("h1")).await.is_ok());
/// assert_eq!(host.byte_reads("h1"), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockHost {
    name: String,
    images: Mutex<HashMap<String, (Dimensions, Vec<u8>)>>,
    failures: Mutex<HashMap<String, usize>>,
    reads: Mutex<HashMap<String, usize>>,
}

impl MockHost {
    /// Create a mock host pre-populated with images (all 1×1).
    pub fn with_images(images: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let images = images
            .into_iter()
            .map(|(hash, bytes)| (hash.into(), (Dimensions::new(1, 1), bytes.into())))
            .collect();
        Self {
            name: "mock".to_string(),
            images: Mutex::new(images),
            failures: Mutex::new(HashMap::new()),
            reads: Mutex::new(HashMap::new()),
        }
    }

    /// Change the name of the mock host.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Content hash the mock uses for [`insert_hashed`](Self::insert_hashed).
    pub fn content_hash(bytes: &[u8]) -> String {
        blake3::hash(bytes).to_hex().to_string()
    }

    /// Add (or replace) an image.
    pub fn insert(&self, hash: impl Into<String>, dimensions: Dimensions, bytes: impl Into<Vec<u8>>) {
        lock(&self.images).insert(hash.into(), (dimensions, bytes.into()));
    }

    /// Add an image keyed by its own content hash, returning the hash.
    pub fn insert_hashed(&self, dimensions: Dimensions, bytes: impl Into<Vec<u8>>) -> String {
        let bytes = bytes.into();
        let hash = Self::content_hash(&bytes);
        self.insert(hash.clone(), dimensions, bytes);
        hash
    }

    /// Make the next `times` byte reads of `hash` fail with a retryable
    /// [`ErrorKind::Host`] error.
    pub fn fail_next(&self, hash: impl Into<String>, times: usize) {
        lock(&self.failures).insert(hash.into(), times);
    }

    /// How many times the bytes of `hash` have been requested.
    pub fn byte_reads(&self, hash: &str) -> usize {
        lock(&self.reads).get(hash).copied().unwrap_or(0)
    }
}
impl Default for MockHost {
    fn default() -> Self {
        let images: [(&str, Vec<u8>); 0] = [];
        Self::with_images(images)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread shouldn't take every other assertion with it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ImageHost for MockHost {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, hash: &str) -> Result<Option<HostImage>> {
        Ok(lock(&self.images).contains_key(hash).then(|| HostImage::new(hash)))
    }

    async fn size(&self, image: &HostImage) -> Result<Dimensions> {
        let images = lock(&self.images);
        let (dimensions, _) = images.get(&image.hash).ok_or_else(|| ErrorKind::NotFound(image.hash.clone()))?;
        Ok(*dimensions)
    }

    async fn bytes(&self, image: &HostImage) -> Result<Vec<u8>> {
        *lock(&self.reads).entry(image.hash.clone()).or_default() += 1;
        if let Some(remaining) = lock(&self.failures).get_mut(&image.hash)
            && *remaining > 0
        {
            *remaining -= 1;
            exn::bail!(ErrorKind::Host(format!("scheduled failure for {}", image.hash)));
        }
        let images = lock(&self.images);
        let (_, bytes) = images.get(&image.hash).ok_or_else(|| ErrorKind::NotFound(image.hash.clone()))?;
        Ok(bytes.clone())
    }
}
