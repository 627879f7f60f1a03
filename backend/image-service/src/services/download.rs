//! Download gate - bounds the number of download streams in flight
//!
//! Admission is a compare-and-increment on an atomic counter, so the ceiling
//! holds across worker threads. Each admitted download owns a [`DownloadPermit`];
//! the permit lives inside the response body stream and releases its slot when
//! the stream is dropped, which happens on completion, on I/O error and when the
//! client disconnects.

use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::storage::ImageStore;
use bytes::Bytes;
use futures::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

/// Process-wide admission counter
#[derive(Debug)]
pub struct DownloadGate {
    active: AtomicUsize,
    max_downloads: usize,
}

impl DownloadGate {
    pub fn new(max_downloads: usize) -> Self {
        Self {
            active: AtomicUsize::new(0),
            max_downloads,
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn max_downloads(&self) -> usize {
        self.max_downloads
    }

    pub fn is_saturated(&self) -> bool {
        self.active() >= self.max_downloads
    }

    /// Take a slot if one is free.
    pub fn try_acquire(self: &Arc<Self>) -> Option<DownloadPermit> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.max_downloads).then_some(current + 1)
            })
            .ok()?;

        metrics::ACTIVE_DOWNLOADS.inc();
        Some(DownloadPermit {
            gate: Arc::clone(self),
        })
    }

    fn release(&self) {
        // Clamped at zero
        let released = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            })
            .is_ok();

        if released {
            metrics::ACTIVE_DOWNLOADS.dec();
        } else {
            warn!("download slot released with counter already at zero");
        }
    }
}

/// One admitted download; dropping it frees the slot.
#[derive(Debug)]
pub struct DownloadPermit {
    gate: Arc<DownloadGate>,
}

impl Drop for DownloadPermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// File body stream that holds its download permit until dropped
#[pin_project]
pub struct GatedStream<S> {
    #[pin]
    inner: S,
    filename: String,
    _permit: DownloadPermit,
}

impl<S> Stream for GatedStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>>,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Err(err))) => {
                error!(filename = %this.filename, "download stream error: {}", err);
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                debug!(filename = %this.filename, "download stream finished");
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

pub type DownloadStream = GatedStream<ReaderStream<tokio::fs::File>>;

/// An admitted download ready to be streamed
pub struct Download {
    pub filename: String,
    pub size: u64,
    pub stream: DownloadStream,
}

/// Run the admission sequence for `filename` and open the file.
///
/// Order: ceiling check before any I/O, then existence (a miss never touches
/// the counter), then the atomic admission.
pub async fn admit(gate: &Arc<DownloadGate>, store: &ImageStore, filename: &str) -> Result<Download> {
    if gate.is_saturated() {
        metrics::DOWNLOAD_REQUESTS_TOTAL
            .with_label_values(&["rejected"])
            .inc();
        return Err(AppError::TooManyRequests(
            "Too many concurrent downloads, please try again later".to_string(),
        ));
    }

    let path = store
        .original_path(filename)
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;

    if !ImageStore::is_file(&path).await {
        metrics::DOWNLOAD_REQUESTS_TOTAL
            .with_label_values(&["not_found"])
            .inc();
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let permit = gate.try_acquire().ok_or_else(|| {
        metrics::DOWNLOAD_REQUESTS_TOTAL
            .with_label_values(&["rejected"])
            .inc();
        AppError::TooManyRequests("Too many concurrent downloads, please try again later".to_string())
    })?;

    // Permit drops on any early return below
    let file = tokio::fs::File::open(&path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("File not found".to_string())
        } else {
            AppError::from(err)
        }
    })?;
    let size = file.metadata().await?.len();

    metrics::DOWNLOAD_REQUESTS_TOTAL
        .with_label_values(&["admitted"])
        .inc();
    debug!(%filename, size, active = gate.active(), "download admitted");

    Ok(Download {
        filename: filename.to_string(),
        size,
        stream: GatedStream {
            inner: ReaderStream::new(file),
            filename: filename.to_string(),
            _permit: permit,
        },
    })
}
