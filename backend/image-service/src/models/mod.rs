/// Data models for image-service
///
/// This module defines structures for:
/// - Upload: per-file outcomes and the batch report
/// - Listing: pagination query and paginated image list
/// - Health: liveness payload
///
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ========================================
// Upload Models
// ========================================

/// Outcome status of one file in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Per-file result reported back to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn success(filename: impl Into<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            size: Some(size),
            status: UploadStatus::Success,
            error: None,
        }
    }

    pub fn failure(filename: impl Into<String>, size: Option<u64>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size,
            status: UploadStatus::Error,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

/// Response body for both upload endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub results: Vec<UploadOutcome>,
    pub total_files: usize,
}

impl From<Vec<UploadOutcome>> for UploadResponse {
    fn from(results: Vec<UploadOutcome>) -> Self {
        Self {
            message: "Files processed".to_string(),
            total_files: results.len(),
            results,
        }
    }
}

// ========================================
// Listing Models
// ========================================

/// Raw pagination query; unparsable values fall back to defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListImagesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListImagesQuery {
    pub fn page(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> usize {
        parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

/// One image in a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub url: String,
    pub download_url: String,
    pub filename: String,
}

/// Paginated listing of the image store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListResponse {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_images: usize,
    pub page_size: usize,
    pub images: Vec<ImageEntry>,
}

// ========================================
// Health Models
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub active_downloads: usize,
}
