//! Upload pipeline - persists a validated batch and builds previews
//!
//! Files are handled strictly in arrival order, one at a time: the original is
//! written, then its preview is generated and awaited before the next file
//! starts. A failure on one file never stops its siblings.

use crate::metrics;
use crate::models::UploadOutcome;
use crate::services::preview::PreviewGenerator;
use crate::services::storage::ImageStore;
use bytes::Bytes;
use tracing::{info, warn};

/// A file that already passed batch validation (type, size, count, name)
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct UploadPipeline {
    store: ImageStore,
    previews: PreviewGenerator,
    preview_failure_is_error: bool,
}

impl UploadPipeline {
    pub fn new(store: ImageStore, previews: PreviewGenerator, preview_failure_is_error: bool) -> Self {
        Self {
            store,
            previews,
            preview_failure_is_error,
        }
    }

    /// Process every file in order and report one outcome per file.
    pub async fn process(&self, files: Vec<IncomingFile>) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());

        for file in files {
            let outcome = self.process_one(file).await;
            metrics::UPLOAD_FILES_TOTAL
                .with_label_values(&[outcome.status.as_str()])
                .inc();
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn process_one(&self, file: IncomingFile) -> UploadOutcome {
        let size = match self.store.write_original(&file.filename, &file.data).await {
            Ok(size) => size,
            Err(err) => {
                warn!(filename = %file.filename, "failed to store original: {}", err);
                return UploadOutcome::failure(file.filename, None, err.to_string());
            }
        };

        info!(
            filename = %file.filename,
            content_type = %file.content_type,
            size,
            "original stored"
        );

        match self.previews.generate(&file.filename).await {
            Ok(_) => UploadOutcome::success(file.filename, size),
            Err(err) if self.preview_failure_is_error => {
                UploadOutcome::failure(file.filename, Some(size), err.to_string())
            }
            // Original is stored; the missing preview is only logged
            Err(_) => UploadOutcome::success(file.filename, size),
        }
    }
}
