use crate::eta::{CALCULATING, DONE, estimate, percent};
use crate::fetch::error::{ErrorKind, Result};
use crate::fetch::item::fetch_with_retry;
use crate::fetch::{FailureSummary, FetchEvent, FetchProgress, FetchRequest, FetchSummary};
use crate::operation::Operation;
use crate::scan::DiscoveredImage;
use async_stream::stream;
use futures::Stream;
use futures::future::join_all;
use imgrab_asyncutils::yield_now;
use imgrab_config::FetchSettings;
use imgrab_document::ImageHost;
use tokio::time::Instant;

/// Phase label of the progress event emitted before the first batch.
pub const PREPARING_PHASE: &str = "Preparing download";
/// Phase label of every per-batch progress event.
pub const DOWNLOAD_PHASE: &str = "Downloading images";

/// Streams [`FetchEvent`]s while fetching `images` from `host`,
/// `settings.batch_size` at a time.
///
/// Items within a batch are fetched concurrently and settle independently.
/// Failed items are counted, left out of every batch, and never retried once
/// their batch is over.
///
/// `operation` is checked before each batch and once more after the last. If
/// it's no longer active the stream yields [`ErrorKind::Cancelled`] and ends:
/// batches may already have been delivered, so stopping is reported rather
/// than silent.
pub fn fetch<'a>(
    host: &'a dyn ImageHost,
    images: Vec<DiscoveredImage>,
    request: FetchRequest,
    operation: &'a Operation,
    settings: &'a FetchSettings,
) -> impl Stream<Item = Result<FetchEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let total = images.len();
        tracing::info!(token = %operation.token(), host = host.name(), total, "Fetch started");
        yield Ok(FetchEvent::Progress(FetchProgress {
            phase: PREPARING_PHASE,
            progress: 0,
            current: 0,
            total,
            eta: CALCULATING.to_string(),
        }));
        yield Ok(FetchEvent::Started { request, total });

        let started = Instant::now();
        let mut processed = 0usize;
        let mut succeeded = 0usize;
        let mut failures = FailureSummary::new(settings.max_image_bytes);

        for batch in images.chunks(settings.batch_size.max(1)) {
            if !operation.is_active() {
                tracing::info!(token = %operation.token(), processed, total, "Fetch cancelled");
                yield Err(exn::Exn::from(ErrorKind::Cancelled));
                return;
            }
            let results = join_all(batch.iter().map(|image| fetch_with_retry(host, image, operation, settings))).await;
            let mut ready = Vec::with_capacity(batch.len());
            for (image, result) in batch.iter().zip(results) {
                match result {
                    Ok(fetched) => ready.push(fetched),
                    Err(err) => {
                        tracing::warn!(hash = %image.hash, name = %image.display_name, error = ?err, "Image could not be fetched");
                        failures.record(&err);
                    },
                }
            }
            processed += batch.len();
            succeeded += ready.len();
            tracing::debug!(processed, total, fetched = ready.len(), "Batch settled");

            if !ready.is_empty() {
                yield Ok(FetchEvent::BatchReady(ready));
            }
            yield Ok(FetchEvent::Progress(FetchProgress {
                phase: DOWNLOAD_PHASE,
                progress: percent(processed, total),
                current: processed,
                total,
                eta: estimate(processed, total, started.elapsed(), settings.eta_min_samples),
            }));
            yield_now().await;
        }

        if failures.failed > 0 {
            tracing::warn!(failed = failures.failed, "Some images could not be fetched");
            yield Ok(FetchEvent::Failures(failures.clone()));
        }
        if !operation.is_active() {
            tracing::info!(token = %operation.token(), "Fetch cancelled after the last batch");
            yield Err(exn::Exn::from(ErrorKind::Cancelled));
            return;
        }
        yield Ok(FetchEvent::Progress(FetchProgress {
            phase: DOWNLOAD_PHASE,
            progress: 100,
            current: succeeded,
            total,
            eta: DONE.to_string(),
        }));
        tracing::info!(token = %operation.token(), succeeded, failed = failures.failed, "Fetch complete");
        yield Ok(FetchEvent::Complete(FetchSummary {
            succeeded,
            failed: failures.failed,
        }));
    })
}
