//! Image Service
//!
//! Accepts image uploads, generates compressed WebP previews, and serves
//! originals and previews with pagination and download throttling.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use services::preview::{PreviewConfig, PreviewGenerator, PreviewProcessor};
use services::{DownloadGate, ImageStore, ListingService, UploadPipeline};

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

/// Shared handler state
pub struct AppState {
    pub store: ImageStore,
    pub pipeline: UploadPipeline,
    pub listing: ListingService,
    pub downloads: Arc<DownloadGate>,
    pub upload: config::UploadConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let store = ImageStore::new(
            config.storage.images_dir.clone(),
            config.storage.previews_dir.clone(),
        );
        let previews = PreviewGenerator::new(
            store.clone(),
            PreviewProcessor::new(PreviewConfig::default()),
        );

        Self {
            pipeline: UploadPipeline::new(
                store.clone(),
                previews,
                config.upload.preview_failure_is_error,
            ),
            listing: ListingService::new(store.clone(), config.app.base_url.clone()),
            downloads: Arc::new(DownloadGate::new(config.download.max_downloads)),
            upload: config.upload.clone(),
            store,
        }
    }
}
