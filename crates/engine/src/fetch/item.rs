use crate::fetch::FetchedImage;
use crate::fetch::error::{Error, ErrorKind, Result};
use crate::operation::Operation;
use crate::scan::DiscoveredImage;
use imgrab_asyncutils::CancellableExt;
use imgrab_config::FetchSettings;
use imgrab_document::ImageHost;
use imgrab_document::error::{Error as HostError, ErrorKind as HostErrorKind};
use imgrab_format::ImageFormat;

/// Fetch a single image, retrying retryable failures.
///
/// Attempt `n` is followed by a `retry_base_delay * n` pause. The operation is
/// checked before every attempt, and an attempt that finishes after the
/// operation stopped being current has its result thrown away. Either way the
/// item fails with [`ErrorKind::Cancelled`] without using up its remaining
/// attempts.
pub(super) async fn fetch_with_retry(
    host: &dyn ImageHost,
    image: &DiscoveredImage,
    operation: &Operation,
    settings: &FetchSettings,
) -> Result<FetchedImage> {
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if !operation.is_active() {
            exn::bail!(ErrorKind::Cancelled);
        }
        let Ok(result) = fetch_one(host, image, settings.max_image_bytes).cancellable(operation).await else {
            exn::bail!(ErrorKind::Cancelled);
        };
        match result {
            Ok(fetched) => return Ok(fetched),
            Err(err) if attempt < max_attempts && err.is_retryable() => {
                tracing::debug!(hash = %image.hash, attempt, error = ?err, "Image fetch failed; retrying");
                tokio::time::sleep(settings.retry_base_delay() * attempt).await;
                attempt += 1;
            },
            Err(err) => return Err(err),
        }
    }
}

/// Resolve, measure and read one image.
async fn fetch_one(host: &dyn ImageHost, image: &DiscoveredImage, limit: u64) -> Result<FetchedImage> {
    let resolved = host
        .resolve(&image.hash)
        .await
        .map_err(|err| host_error(err, &image.hash))?
        .ok_or_else(|| exn::Exn::from(ErrorKind::ImageNotFound(image.hash.clone())))?;
    let dimensions = host.size(&resolved).await.map_err(|err| host_error(err, &image.hash))?;
    let bytes = host.bytes(&resolved).await.map_err(|err| host_error(err, &image.hash))?;

    let byte_size = bytes.len() as u64;
    if byte_size > limit {
        exn::bail!(ErrorKind::ImageTooLarge { size: byte_size, limit });
    }
    Ok(FetchedImage {
        image: image.clone(),
        format: ImageFormat::from_magic_bytes(&bytes),
        bytes,
        byte_size,
        width: dimensions.width,
        height: dimensions.height,
    })
}

fn host_error(err: HostError, hash: &str) -> Error {
    let missing = matches!(&*err, HostErrorKind::NotFound(_));
    match missing {
        true => err.raise(ErrorKind::ImageNotFound(hash.to_string())),
        false => err.raise(ErrorKind::Host),
    }
}
