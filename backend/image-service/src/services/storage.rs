//! Image store - originals and previews on the local filesystem
//!
//! Originals live in one directory and previews in a sibling directory, sharing
//! filenames 1:1. The filename is the primary key: writing an existing name
//! replaces it.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Extensions served by the listing endpoint
pub const LISTABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

const MAX_FILENAME_BYTES: usize = 255;

/// Filesystem-derived view of one original
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub modified_at: SystemTime,
}

/// Reject names that could escape the store directory or are not real names.
pub fn validate_filename(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(AppError::ValidationError("Filename is empty".to_string()));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(AppError::ValidationError(format!(
            "Filename exceeds {} bytes",
            MAX_FILENAME_BYTES
        )));
    }
    if name.chars().all(|c| c == '.') {
        return Err(AppError::ValidationError(format!(
            "Invalid filename: {}",
            name
        )));
    }
    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
    {
        return Err(AppError::ValidationError(format!(
            "Invalid filename: {}",
            name
        )));
    }
    Ok(name)
}

/// True when the extension is one of [`LISTABLE_EXTENSIONS`], case-insensitively.
pub fn is_listable_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            LISTABLE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Directory-backed store for originals and previews
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
    previews_dir: PathBuf,
}

impl ImageStore {
    pub fn new(images_dir: impl Into<PathBuf>, previews_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            previews_dir: previews_dir.into(),
        }
    }

    /// Create both directories if they do not exist yet
    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.images_dir).await?;
        tokio::fs::create_dir_all(&self.previews_dir).await?;
        Ok(())
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn previews_dir(&self) -> &Path {
        &self.previews_dir
    }

    pub fn original_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.images_dir.join(validate_filename(filename)?))
    }

    pub fn preview_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.previews_dir.join(validate_filename(filename)?))
    }

    /// Persist original bytes unmodified, replacing any previous file of that name.
    pub async fn write_original(&self, filename: &str, data: &[u8]) -> Result<u64> {
        let path = self.original_path(filename)?;
        tokio::fs::write(&path, data).await?;
        debug!(path = %path.display(), size = data.len(), "original stored");
        Ok(data.len() as u64)
    }

    pub async fn read_original(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.original_path(filename)?;
        Ok(tokio::fs::read(&path).await?)
    }

    pub async fn write_preview(&self, filename: &str, data: &[u8]) -> Result<()> {
        let path = self.preview_path(filename)?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    /// Regular-file check that never errors; invalid names simply do not exist.
    pub async fn is_file(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Read the originals directory and stat every listable file.
    ///
    /// Files that disappear between the directory read and the stat are skipped.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let mut entries = tokio::fs::read_dir(&self.images_dir).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let filename = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!(name = ?raw, "skipping non UTF-8 filename");
                    continue;
                }
            };

            if !is_listable_image(&filename) {
                continue;
            }

            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(err) => {
                    warn!(%filename, "stat failed during listing: {}", err);
                    continue;
                }
            };

            if !meta.is_file() {
                continue;
            }

            records.push(ImageRecord {
                filename,
                size_bytes: meta.len(),
                modified_at: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(records)
    }
}
