//! The engine as the presentation layer sees it.

use crate::error::{ErrorKind, Result};
use crate::fetch::error::ErrorKind as FetchErrorKind;
use crate::fetch::{FetchRequest, fetch};
use crate::operation::Operations;
use crate::protocol::{Inbound, Outbound};
use crate::scan::error::ErrorKind as ScanErrorKind;
use crate::scan::{DiscoveredImage, ScanEvent, ScanMode, scan};
use futures::{StreamExt, pin_mut};
use imgrab_config::Config;
use imgrab_document::{Document, HostHandle, NodeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Shown when a selection-only scan is started with nothing selected.
pub const NO_SELECTION_MESSAGE: &str = "Please select one or more frames, groups or layers to scan for images.";

/// One plugin session over one open document.
///
/// Inbound messages are handled concurrently (see [`run`](Self::run)), so a
/// cancel can arrive while a scan or download is in progress. Everything a
/// handler has to say goes out on the outbound channel.
pub struct Session {
    document: Arc<Document>,
    host: HostHandle,
    operations: Arc<Operations>,
    config: Config,
    ready: AtomicBool,
    selection: RwLock<Vec<NodeId>>,
    discovered: RwLock<Arc<Vec<DiscoveredImage>>>,
    outbound: UnboundedSender<Outbound>,
}

impl Session {
    pub fn new(document: Arc<Document>, host: HostHandle, config: Config, outbound: UnboundedSender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            document,
            host,
            operations: Operations::new(),
            config,
            ready: AtomicBool::new(false),
            selection: RwLock::new(Vec::new()),
            discovered: RwLock::new(Arc::new(Vec::new())),
            outbound,
        })
    }

    pub fn operations(&self) -> &Arc<Operations> {
        &self.operations
    }

    /// Replace the current selection and report its size.
    pub async fn set_selection(&self, selection: Vec<NodeId>) {
        let count = selection.len();
        *self.selection.write().await = selection;
        self.emit(Outbound::SelectionChanged { count });
    }

    /// The image list published by the last scan to complete.
    pub async fn discovered(&self) -> Arc<Vec<DiscoveredImage>> {
        Arc::clone(&*self.discovered.read().await)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// The host is closing the plugin: stop whatever is running.
    pub fn shutdown(&self) {
        tracing::info!("Session shutting down");
        self.operations.cancel();
    }

    /// Handle every message from `inbound` until the channel closes, then wait
    /// for the handlers still running.
    pub async fn run(self: Arc<Self>, mut inbound: UnboundedReceiver<Inbound>) {
        let mut handlers = JoinSet::new();
        while let Some(message) = inbound.recv().await {
            let session = Arc::clone(&self);
            handlers.spawn(async move { session.dispatch(message).await });
        }
        while let Some(joined) = handlers.join_next().await {
            if let Err(err) = joined {
                tracing::error!(error = %err, "Message handler panicked");
                self.emit(Outbound::error("Something went wrong. Please try again."));
            }
        }
    }

    /// Handle one message, turning any error into an error notification.
    pub async fn dispatch(&self, message: Inbound) {
        if let Err(err) = self.handle(message).await {
            tracing::error!(error = ?err, "Message handler failed");
            self.emit(Outbound::error(format!("Something went wrong: {}", *err)));
        }
    }

    /// Parse and dispatch a raw JSON message. Unrecognised messages are
    /// logged and dropped.
    pub async fn dispatch_json(&self, json: &str) {
        match Inbound::from_json(json) {
            Ok(message) => self.dispatch(message).await,
            Err(err) => tracing::warn!(error = ?err, "Ignoring inbound message"),
        }
    }

    pub async fn handle(&self, message: Inbound) -> Result<()> {
        tracing::debug!(?message, "Inbound message");
        match message {
            Inbound::StartScan { mode } => self.start_scan(mode).await,
            Inbound::StartDownload {
                images,
                download_type,
                formats,
                rename_pattern,
            } => {
                let request = FetchRequest {
                    download_type,
                    formats,
                    rename_pattern,
                };
                self.start_download(images, request).await
            },
            Inbound::CancelOperation => {
                self.operations.cancel();
                Ok(())
            },
            Inbound::ReadyNotification => {
                self.mark_ready();
                Ok(())
            },
        }
    }

    fn emit(&self, message: Outbound) {
        if self.outbound.send(message).is_err() {
            tracing::debug!("Outbound channel closed; dropping message");
        }
    }

    /// Poll until the presentation layer has said it's listening. Gives up
    /// (and carries on regardless) after the configured timeout.
    async fn wait_until_ready(&self) {
        let settings = &self.config.session;
        let deadline = Instant::now() + settings.ready_timeout();
        while !self.is_ready() {
            if Instant::now() >= deadline {
                tracing::warn!(timeout = ?settings.ready_timeout(), "Presentation layer never reported ready; continuing");
                return;
            }
            tokio::time::sleep(settings.ready_poll_interval()).await;
        }
    }

    async fn start_scan(&self, mode: ScanMode) -> Result<()> {
        self.wait_until_ready().await;
        let operation = self.operations.begin();
        let roots = match mode {
            ScanMode::All => self.document.pages().to_vec(),
            ScanMode::SelectionOnly => self.selection.read().await.clone(),
        };

        let events = scan(&self.document, roots, mode, &operation, &self.config.scan);
        pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(ScanEvent::Complete(images)) => {
                    *self.discovered.write().await = Arc::new(images.clone());
                    self.emit(Outbound::ScanComplete { images });
                    return Ok(());
                },
                Ok(event) => self.emit(event.into()),
                Err(err) if matches!(&*err, ScanErrorKind::NoSelection) => {
                    tracing::info!("Selection-only scan requested with nothing selected");
                    self.emit(Outbound::error(NO_SELECTION_MESSAGE));
                    return Ok(());
                },
                Err(err) => return Err(err.raise(ErrorKind::Scan)),
            }
        }
        // The scan stopped early. A newer operation speaks for itself; an
        // explicit cancel is acknowledged.
        if self.operations.current() == Some(operation.token()) {
            self.emit(Outbound::OperationCancelled);
        }
        Ok(())
    }

    async fn start_download(&self, images: Vec<DiscoveredImage>, request: FetchRequest) -> Result<()> {
        self.wait_until_ready().await;
        let operation = self.operations.begin();

        let events = fetch(&*self.host, images, request, &operation, &self.config.fetch);
        pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => self.emit(event.into()),
                Err(err) if matches!(&*err, FetchErrorKind::Cancelled) => {
                    self.emit(Outbound::OperationCancelled);
                    return Ok(());
                },
                Err(err) => return Err(err.raise(ErrorKind::Fetch)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgrab_document::host::MockHost;
    use imgrab_document::{ExportedDocument, ExportedNode, Paint};
    use tokio::sync::mpsc::unbounded_channel;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn document() -> Arc<Document> {
        let export = ExportedDocument::with_pages(vec![
            ExportedNode::page("Home").child(
                ExportedNode::frame("Hero")
                    .child(ExportedNode::rectangle("Background").fill(Paint::image("h1")))
                    .child(ExportedNode::rectangle("Icon").fill(Paint::image("h2"))),
            ),
            ExportedNode::page("About").child(ExportedNode::rectangle("Portrait").fill(Paint::image("h3"))),
        ]);
        Arc::new(Document::from_export(export).unwrap())
    }

    fn session() -> (Arc<Session>, Arc<MockHost>, UnboundedReceiver<Outbound>) {
        let host = Arc::new(MockHost::with_images([("h1", PNG), ("h2", PNG), ("h3", PNG)]));
        let (outbound, received) = unbounded_channel();
        let session = Session::new(document(), host.clone(), Config::default(), outbound);
        session.mark_ready();
        (session, host, received)
    }

    fn drain(received: &mut UnboundedReceiver<Outbound>) -> Vec<Outbound> {
        let mut messages = Vec::new();
        while let Ok(message) = received.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_scan_publishes_results() {
        let (session, _, mut received) = session();
        session.handle(Inbound::StartScan { mode: ScanMode::All }).await.unwrap();

        let messages = drain(&mut received);
        let Some(Outbound::ScanComplete { images }) = messages.last() else {
            panic!("expected scan-complete, got {messages:?}");
        };
        let names: Vec<(&str, &str)> =
            images.iter().map(|image| (image.display_name.as_str(), image.container_name.as_str())).collect();
        assert_eq!(names, vec![("Background", "Hero"), ("Icon", "Hero"), ("Portrait", "Page")]);
        assert_eq!(session.discovered().await.as_slice(), images.as_slice());
    }

    #[tokio::test]
    async fn test_selection_scan() {
        let (session, _, mut received) = session();
        let hero = session.document.find_by_name("Hero");
        session.set_selection(hero).await;
        session.handle(Inbound::StartScan { mode: ScanMode::SelectionOnly }).await.unwrap();

        let messages = drain(&mut received);
        assert_eq!(messages[0], Outbound::SelectionChanged { count: 1 });
        let Some(Outbound::ScanComplete { images }) = messages.last() else {
            panic!("expected scan-complete, got {messages:?}");
        };
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_selection_is_actionable() {
        let (session, _, mut received) = session();
        session.handle(Inbound::StartScan { mode: ScanMode::SelectionOnly }).await.unwrap();
        assert_eq!(drain(&mut received), vec![Outbound::error(NO_SELECTION_MESSAGE)]);
        assert!(session.discovered().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_flow() {
        let (session, _, mut received) = session();
        session.handle(Inbound::StartScan { mode: ScanMode::All }).await.unwrap();
        drain(&mut received);

        let images = session.discovered().await.to_vec();
        session
            .handle(Inbound::StartDownload {
                images,
                download_type: "zip".to_string(),
                formats: vec!["png".to_string()],
                rename_pattern: None,
            })
            .await
            .unwrap();

        let messages = drain(&mut received);
        assert!(matches!(&messages[0], Outbound::DownloadProgress { current: 0, total: 3, .. }));
        assert!(matches!(&messages[1], Outbound::DownloadStart { total_images: 3, .. }));
        assert!(matches!(&messages[2], Outbound::ImagesBatchReady { images } if images.len() == 3));
        assert_eq!(messages.last(), Some(&Outbound::DownloadFinish));
        assert!(!messages.iter().any(|message| matches!(message, Outbound::ErrorNotification { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_waits_for_ready_and_echoes_formats() {
        let (outbound, mut received) = unbounded_channel();
        let host = Arc::new(MockHost::with_images([("h1", PNG)]));
        let session = Session::new(document(), host.clone(), Config::default(), outbound);
        let images = vec![DiscoveredImage {
            hash: "h1".to_string(),
            display_name: "Background".to_string(),
            container_name: "Hero".to_string(),
        }];
        let downloading = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .handle(Inbound::StartDownload {
                        images,
                        download_type: "zip".to_string(),
                        formats: vec!["original".to_string(), "svg".to_string()],
                        rename_pattern: Some("{name}".to_string()),
                    })
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(received.try_recv().is_err());
        assert_eq!(host.byte_reads("h1"), 0);

        session.handle(Inbound::ReadyNotification).await.unwrap();
        downloading.await.unwrap().unwrap();
        let messages = drain(&mut received);
        assert_eq!(
            messages[1],
            Outbound::DownloadStart {
                download_type: "zip".to_string(),
                formats: vec!["original".to_string(), "svg".to_string()],
                rename_pattern: Some("{name}".to_string()),
                total_images: 1,
            }
        );
        assert_eq!(messages.last(), Some(&Outbound::DownloadFinish));
        assert!(!messages.iter().any(|message| matches!(message, Outbound::ErrorNotification { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_download() {
        let (session, host, mut received) = session();
        let images: Vec<DiscoveredImage> = (0..25)
            .map(|i| {
                let hash = format!("x{i}");
                host.insert(hash.clone(), Default::default(), PNG);
                DiscoveredImage {
                    hash,
                    display_name: format!("image {i}"),
                    container_name: "Page".to_string(),
                }
            })
            .collect();
        // Holds the second batch in a retry pause long enough to cancel.
        host.fail_next("x10", 1);

        let (inbound, inbound_rx) = unbounded_channel();
        let running = tokio::spawn(Arc::clone(&session).run(inbound_rx));
        inbound
            .send(Inbound::StartDownload {
                images,
                download_type: "zip".to_string(),
                formats: vec![],
                rename_pattern: None,
            })
            .unwrap();

        // Wait for the first batch, then cancel.
        loop {
            match received.recv().await.unwrap() {
                Outbound::ImagesBatchReady { .. } => break,
                _ => continue,
            }
        }
        inbound.send(Inbound::CancelOperation).unwrap();
        drop(inbound);
        running.await.unwrap();

        let rest = drain(&mut received);
        assert_eq!(rest.last(), Some(&Outbound::OperationCancelled));
        assert!(!rest.contains(&Outbound::DownloadFinish));
        assert!(rest.iter().filter(|message| matches!(message, Outbound::ImagesBatchReady { .. })).count() <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_ready() {
        let (outbound, mut received) = unbounded_channel();
        let session = Session::new(document(), Arc::new(MockHost::default()), Config::default(), outbound);
        let scanning = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.handle(Inbound::StartScan { mode: ScanMode::All }).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(received.try_recv().is_err());

        session.handle(Inbound::ReadyNotification).await.unwrap();
        scanning.await.unwrap().unwrap();
        assert!(matches!(drain(&mut received).last(), Some(Outbound::ScanComplete { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_timeout_proceeds() {
        let (outbound, mut received) = unbounded_channel();
        let session = Session::new(document(), Arc::new(MockHost::default()), Config::default(), outbound);
        session.handle(Inbound::StartScan { mode: ScanMode::All }).await.unwrap();
        assert!(matches!(drain(&mut received).last(), Some(Outbound::ScanComplete { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_cancels() {
        let (session, _, _received) = session();
        let operation = session.operations().begin();
        session.shutdown();
        assert!(!operation.is_active());
    }

    #[tokio::test]
    async fn test_unknown_json_is_dropped() {
        let (session, _, mut received) = session();
        session.dispatch_json(r#"{"type":"selfDestruct"}"#).await;
        assert!(drain(&mut received).is_empty());
        session.dispatch_json(r#"{"type":"startScan","mode":"selectionOnly"}"#).await;
        assert_eq!(drain(&mut received), vec![Outbound::error(NO_SELECTION_MESSAGE)]);
    }
}
