//! Preview generator - coordinates reading an original, processing it, and
//! storing the preview under the same filename
//!
//! The preview keeps the original's filename and extension even though the
//! bytes are WebP; static serving labels previews `image/webp`.

use super::processor::{PreviewError, PreviewProcessor, PreviewResult};
use crate::metrics;
use crate::services::storage::ImageStore;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Clone)]
pub struct PreviewGenerator {
    store: ImageStore,
    processor: Arc<PreviewProcessor>,
}

impl PreviewGenerator {
    pub fn new(store: ImageStore, processor: PreviewProcessor) -> Self {
        Self {
            store,
            processor: Arc::new(processor),
        }
    }

    /// Build the preview for a stored original.
    ///
    /// Failures are logged and returned as values; callers treat them as best effort.
    pub async fn generate(&self, filename: &str) -> Result<PreviewResult, PreviewError> {
        let started = Instant::now();
        let result = self.generate_inner(filename).await;

        metrics::PREVIEW_GENERATION_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
        match &result {
            Ok(preview) => {
                metrics::PREVIEW_GENERATION_TOTAL
                    .with_label_values(&["success"])
                    .inc();
                info!(
                    %filename,
                    width = preview.width,
                    height = preview.height,
                    size = preview.data.len(),
                    "preview generated"
                );
            }
            Err(err) => {
                metrics::PREVIEW_GENERATION_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                error!(%filename, "preview generation failed: {}", err);
            }
        }

        result
    }

    async fn generate_inner(&self, filename: &str) -> Result<PreviewResult, PreviewError> {
        let original = self
            .store
            .read_original(filename)
            .await
            .map_err(|e| PreviewError::Read(e.to_string()))?;

        let preview = self
            .processor
            .clone()
            .generate_async(Bytes::from(original))
            .await?;

        self.store
            .write_preview(filename, &preview.data)
            .await
            .map_err(|e| PreviewError::Store(e.to_string()))?;

        Ok(preview)
    }
}
