//! Messages exchanged with the presentation layer.
//!
//! Both directions are JSON objects tagged by a camelCase `type`, with
//! camelCase fields:
//!
//! ```json
//! {"type": "startScan", "mode": "selectionOnly"}
//! {"type": "scanProgress", "phase": "Scanning layers", "progress": 40, "current": 200, "total": 500}
//! ```

use crate::error::{ErrorKind, Result};
use crate::fetch::{FetchEvent, FetchRequest, FetchedImage};
use crate::scan::{DiscoveredImage, ScanEvent, ScanMode};
use exn::ResultExt;
use serde::{Deserialize, Serialize};

/// Requests from the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Inbound {
    StartScan {
        #[serde(default)]
        mode: ScanMode,
    },
    StartDownload {
        images: Vec<DiscoveredImage>,
        #[serde(default)]
        download_type: String,
        #[serde(default)]
        formats: Vec<String>,
        #[serde(default)]
        rename_pattern: Option<String>,
    },
    CancelOperation,
    /// The presentation layer is listening.
    #[serde(alias = "ready")]
    ReadyNotification,
}
impl Inbound {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).or_raise(|| ErrorKind::Protocol("unrecognised inbound message".to_string()))
    }
}

/// Updates sent to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outbound {
    SelectionChanged {
        count: usize,
    },
    ScanProgress {
        phase: String,
        progress: u8,
        current: usize,
        total: usize,
    },
    ScanComplete {
        images: Vec<DiscoveredImage>,
    },
    DownloadStart {
        download_type: String,
        formats: Vec<String>,
        rename_pattern: Option<String>,
        total_images: usize,
    },
    DownloadProgress {
        phase: String,
        progress: u8,
        current: usize,
        total: usize,
        eta: String,
    },
    ImagesBatchReady {
        images: Vec<FetchedImage>,
    },
    DownloadFinish,
    /// Informational: the user (or a newer request) stopped the operation.
    OperationCancelled,
    ErrorNotification {
        message: String,
    },
}
impl Outbound {
    pub fn error(message: impl Into<String>) -> Self {
        Outbound::ErrorNotification {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).or_raise(|| ErrorKind::Protocol("outbound message is not serializable".to_string()))
    }
}

impl From<ScanEvent> for Outbound {
    fn from(event: ScanEvent) -> Self {
        match event {
            ScanEvent::Progress(progress) => Outbound::ScanProgress {
                phase: progress.phase.to_string(),
                progress: progress.progress,
                current: progress.current,
                total: progress.total,
            },
            ScanEvent::Complete(images) => Outbound::ScanComplete { images },
        }
    }
}

impl From<FetchEvent> for Outbound {
    fn from(event: FetchEvent) -> Self {
        match event {
            FetchEvent::Progress(progress) => Outbound::DownloadProgress {
                phase: progress.phase.to_string(),
                progress: progress.progress,
                current: progress.current,
                total: progress.total,
                eta: progress.eta,
            },
            FetchEvent::Started {
                request:
                    FetchRequest {
                        download_type,
                        formats,
                        rename_pattern,
                    },
                total,
            } => Outbound::DownloadStart {
                download_type,
                formats,
                rename_pattern,
                total_images: total,
            },
            FetchEvent::BatchReady(images) => Outbound::ImagesBatchReady { images },
            FetchEvent::Failures(summary) => Outbound::error(summary.message()),
            FetchEvent::Complete(_) => Outbound::DownloadFinish,
        }
    }
}
