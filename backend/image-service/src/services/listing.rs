//! Listing service - paginated view over the image store
//!
//! Every call re-reads the directory and re-sorts; there is no index.

use crate::error::Result;
use crate::models::{ImageEntry, ImageListResponse};
use crate::services::storage::{ImageRecord, ImageStore};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ListingService {
    store: ImageStore,
    base_url: String,
}

impl ListingService {
    pub fn new(store: ImageStore, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List one page of originals, most recently modified first.
    ///
    /// `page` is 1-based; both arguments must be positive.
    pub async fn list(&self, page: usize, limit: usize) -> Result<ImageListResponse> {
        let mut records = self.store.list_images().await?;
        sort_newest_first(&mut records);

        let total_images = records.len();
        let total_bytes: u64 = records.iter().map(|record| record.size_bytes).sum();
        debug!(total_images, total_bytes, page, limit, "listing images");

        let images = paginate(&records, page, limit)
            .iter()
            .map(|record| self.entry_for(&record.filename))
            .collect();

        Ok(ImageListResponse {
            current_page: page,
            total_pages: total_pages(total_images, limit),
            total_images,
            page_size: limit,
            images,
        })
    }

    fn entry_for(&self, filename: &str) -> ImageEntry {
        let encoded = urlencoding::encode(filename);
        ImageEntry {
            url: format!("{}/preview/{}", self.base_url, encoded),
            download_url: format!("{}/api/download/{}", self.base_url, encoded),
            filename: filename.to_string(),
        }
    }
}

/// Newest first; equal timestamps fall back to filename order.
pub fn sort_newest_first(records: &mut [ImageRecord]) {
    records.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

pub fn total_pages(total: usize, limit: usize) -> usize {
    total.div_ceil(limit.max(1))
}

/// Slice `[(page-1)*limit, (page-1)*limit + limit)`, empty when out of range.
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(limit);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(limit).min(items.len());
    &items[start..end]
}
