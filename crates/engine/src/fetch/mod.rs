//! Batched retrieval of discovered images.
//!
//! [`fetch`] resolves each [`DiscoveredImage`] through the
//! [`ImageHost`](imgrab_document::ImageHost) and hands back its original
//! encoded bytes, a fixed number of images at a time. Within a batch every
//! image is fetched concurrently and retried on its own; one image failing
//! never takes its siblings down with it. Failures are counted and reported
//! once, at the end.

pub mod error;
mod item;
mod stream;

pub use self::stream::{DOWNLOAD_PHASE, PREPARING_PHASE, fetch};
use crate::fetch::error::ErrorKind;
use crate::scan::DiscoveredImage;
use imgrab_format::ImageFormat;
use serde::{Deserialize, Serialize};

/// What the caller asked for, echoed back in [`FetchEvent::Started`].
///
/// None of this is interpreted here: conversion and renaming happen in the
/// presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub download_type: String,
    pub formats: Vec<String>,
    pub rename_pattern: Option<String>,
}

/// A discovered image together with its encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedImage {
    #[serde(flatten)]
    pub image: DiscoveredImage,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// Fetch progress after each batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchProgress {
    pub phase: &'static str,
    pub progress: u8,
    pub current: usize,
    pub total: usize,
    pub eta: String,
}

/// Per-category count of items that couldn't be fetched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FailureSummary {
    pub failed: usize,
    pub not_found: usize,
    pub too_large: usize,
    pub cancelled: usize,
    pub host: usize,
    /// The size ceiling in force, for the user-facing message.
    pub limit_bytes: u64,
}
impl FailureSummary {
    fn new(limit_bytes: u64) -> Self {
        Self {
            limit_bytes,
            ..Self::default()
        }
    }

    fn record(&mut self, kind: &ErrorKind) {
        self.failed += 1;
        match kind {
            ErrorKind::Cancelled => self.cancelled += 1,
            ErrorKind::ImageNotFound(_) => self.not_found += 1,
            ErrorKind::ImageTooLarge { .. } => self.too_large += 1,
            ErrorKind::Host => self.host += 1,
        }
    }

    /// One message covering every failure.
    ///
    /// ```
    /// # use imgrab_engine::fetch::FailureSummary;
    /// let summary = FailureSummary { failed: 2, too_large: 1, not_found: 1, limit_bytes: 50 * 1024 * 1024, ..Default::default() };
    /// assert_eq!(
    ///     summary.message(),
    ///     "2 images could not be downloaded (over 50 MB or unavailable): 1 too large, 1 not found",
    /// );
    /// ```
    pub fn message(&self) -> String {
        let plural = if self.failed == 1 { "image" } else { "images" };
        let megabytes = self.limit_bytes / (1024 * 1024);
        let breakdown: Vec<String> = [
            (self.too_large, "too large"),
            (self.not_found, "not found"),
            (self.host, "host error"),
            (self.cancelled, "cancelled"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();
        format!(
            "{} {plural} could not be downloaded (over {megabytes} MB or unavailable): {}",
            self.failed,
            breakdown.join(", ")
        )
    }
}

/// Final tally, emitted with [`FetchEvent::Complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Events emitted by [`fetch`], in order:
///
/// 1. [`Progress`](Self::Progress) in the "preparing" phase, then
///    [`Started`](Self::Started).
/// 2. For each batch: [`BatchReady`](Self::BatchReady) if anything in it was
///    fetched, then [`Progress`](Self::Progress).
/// 3. [`Failures`](Self::Failures) if anything failed.
/// 4. A final [`Progress`](Self::Progress) at 100%, then
///    [`Complete`](Self::Complete).
///
/// If the operation stops being current, the stream ends with a
/// [`Cancelled`](error::ErrorKind::Cancelled) error instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchEvent {
    Progress(FetchProgress),
    Started { request: FetchRequest, total: usize },
    BatchReady(Vec<FetchedImage>),
    Failures(FailureSummary),
    Complete(FetchSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary() {
        let mut summary = FailureSummary::new(10 * 1024 * 1024);
        summary.record(&ErrorKind::ImageTooLarge { size: 1, limit: 0 });
        assert_eq!(summary.message(), "1 image could not be downloaded (over 10 MB or unavailable): 1 too large");
        summary.record(&ErrorKind::Host);
        summary.record(&ErrorKind::Cancelled);
        assert_eq!(summary.failed, 3);
        assert_eq!(
            summary.message(),
            "3 images could not be downloaded (over 10 MB or unavailable): 1 too large, 1 host error, 1 cancelled"
        );
    }

    #[test]
    fn test_fetched_image_serializes_flat() {
        let fetched = FetchedImage {
            image: DiscoveredImage {
                hash: "h1".to_string(),
                display_name: "Icon".to_string(),
                container_name: "Hero".to_string(),
            },
            bytes: vec![1, 2],
            format: ImageFormat::Png,
            byte_size: 2,
            width: 3,
            height: 4,
        };
        let value = serde_json::to_value(&fetched).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "identity": "h1", "displayName": "Icon", "containerName": "Hero",
                "bytes": [1, 2], "format": "PNG", "byteSize": 2, "width": 3, "height": 4,
            })
        );
    }
}
