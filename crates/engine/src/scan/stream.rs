use crate::eta::percent;
use crate::operation::Operation;
use crate::scan::candidate::Candidates;
use crate::scan::error::{ErrorKind, Result};
use crate::scan::{ScanEvent, ScanMode, ScanProgress};
use async_stream::stream;
use futures::Stream;
use imgrab_asyncutils::yield_now;
use imgrab_config::ScanSettings;
use imgrab_document::{Document, NodeId};
use tokio::time::Instant;

/// Phase label carried by every scan progress event.
pub const SCAN_PHASE: &str = "Scanning layers";

/// Streams [`ScanEvent`]s for a depth-first walk of `roots` and everything
/// beneath them.
///
/// Nodes are popped from the stack `settings.chunk_size` at a time. After each
/// chunk, if at least `settings.progress_interval` has passed since the last
/// report, a [`ScanEvent::Progress`] is emitted and the stream yields to the
/// executor. The percentage is measured against a running estimate (roots
/// plus every child pushed so far) and held at `settings.progress_cap` until
/// the walk is finished.
///
/// `operation` is checked before every node. Once it's no longer active the
/// stream ends quietly: no error, and no [`ScanEvent::Complete`].
///
/// A [`ScanMode::SelectionOnly`] scan with no `roots` yields a single
/// [`ErrorKind::NoSelection`] error. Children that don't exist in the
/// document are skipped.
pub fn scan<'a>(
    document: &'a Document,
    roots: Vec<NodeId>,
    mode: ScanMode,
    operation: &'a Operation,
    settings: &'a ScanSettings,
) -> impl Stream<Item = Result<ScanEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        if mode == ScanMode::SelectionOnly && roots.is_empty() {
            yield Err(exn::Exn::from(ErrorKind::NoSelection));
            return;
        }
        tracing::info!(token = %operation.token(), roots = roots.len(), ?mode, "Scan started");

        let chunk_size = settings.chunk_size.max(1);
        let interval = settings.progress_interval();
        // Reverse so the first root is popped first.
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        let mut estimated = stack.len();
        let mut visited = 0usize;
        let mut candidates = Candidates::default();
        let mut last_report = Instant::now();

        while !stack.is_empty() {
            for _ in 0..chunk_size {
                if !operation.is_active() {
                    tracing::debug!(token = %operation.token(), visited, "Scan superseded; stopping");
                    return;
                }
                let Some(id) = stack.pop() else { break };
                visited += 1;
                let Some(node) = document.node(id) else {
                    tracing::debug!(node = %id, "Skipping unknown node");
                    continue;
                };
                for hash in node.image_hashes() {
                    candidates.register(document, node, hash, operation);
                }
                // Reversed, so that children pop in their original order.
                stack.extend(node.children.iter().rev().copied());
                estimated += node.children.len();
            }

            if last_report.elapsed() >= interval {
                last_report = Instant::now();
                tracing::trace!(visited, estimated, found = candidates.len(), "Scan progress");
                yield Ok(ScanEvent::Progress(ScanProgress {
                    phase: SCAN_PHASE,
                    progress: percent(visited, estimated).min(settings.progress_cap),
                    current: visited,
                    total: estimated,
                }));
                yield_now().await;
            }
        }

        if !operation.is_active() {
            return;
        }
        let images = candidates.into_images();
        tracing::info!(token = %operation.token(), visited, images = images.len(), "Scan complete");
        yield Ok(ScanEvent::Complete(images));
    })
}
