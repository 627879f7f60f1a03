//! Preview processor - generates previews from original images
//!
//! Takes an image, applies its EXIF orientation, shrinks it to the configured
//! max width while maintaining aspect ratio, and encodes it as lossy WebP.
//!
//! Uses `spawn_blocking` for CPU-intensive operations to avoid blocking the async runtime.

use bytes::Bytes;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failures while producing a preview. Never surfaced as an HTTP error.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to read original: {0}")]
    Read(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode preview: {0}")]
    Encode(String),

    #[error("failed to store preview: {0}")]
    Store(String),

    #[error("preview task panicked: {0}")]
    Task(String),
}

/// Configuration for preview generation
#[derive(Clone, Debug)]
pub struct PreviewConfig {
    /// Maximum width in pixels; narrower images keep their size
    pub max_width: u32,
    /// WebP quality (0-100)
    pub quality: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: 1000,
            quality: 30.0,
        }
    }
}

/// Result of preview generation
#[derive(Debug)]
pub struct PreviewResult {
    /// The preview image data as WebP
    pub data: Bytes,
    /// Width of the preview
    pub width: u32,
    /// Height of the preview
    pub height: u32,
}

/// Preview processor
pub struct PreviewProcessor {
    config: PreviewConfig,
}

impl PreviewProcessor {
    /// Create a new processor with the given configuration
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Create a processor with default configuration
    pub fn with_defaults() -> Self {
        Self::new(PreviewConfig::default())
    }

    /// Generate a preview from the given image data (blocking version)
    ///
    /// **Note:** This method performs CPU-intensive operations and should not be called
    /// directly from async code. Use `generate_async` instead.
    pub fn generate(&self, original_data: &[u8]) -> Result<PreviewResult, PreviewError> {
        let img = decode_oriented(original_data)?;

        let (orig_w, orig_h) = img.dimensions();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            "Processing image for preview"
        );

        let (new_w, new_h) = self.calculate_dimensions(orig_w, orig_h);

        let img = if new_w < orig_w {
            img.resize_exact(new_w, new_h, FilterType::Triangle)
        } else {
            debug!("Image already within max width, encoding as-is");
            img
        };

        let data = self.encode_webp(&img)?;

        debug!(
            width = new_w,
            height = new_h,
            size = data.len(),
            "Preview generated"
        );

        Ok(PreviewResult {
            data,
            width: new_w,
            height: new_h,
        })
    }

    /// Generate a preview asynchronously using a blocking thread pool
    ///
    /// # Example
    /// ```ignore
    /// let processor = Arc::new(PreviewProcessor::with_defaults());
    /// let result = processor.generate_async(image_bytes).await?;
    /// ```
    pub async fn generate_async(
        self: Arc<Self>,
        original_data: Bytes,
    ) -> Result<PreviewResult, PreviewError> {
        let processor = self.clone();

        tokio::task::spawn_blocking(move || processor.generate(&original_data))
            .await
            .map_err(|e| PreviewError::Task(e.to_string()))?
    }

    /// Calculate new dimensions, bounding only the width and never upscaling
    fn calculate_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_w = self.config.max_width;

        if width <= max_w {
            return (width, height);
        }

        let ratio = max_w as f64 / width as f64;
        (max_w, ((height as f64) * ratio).round().max(1.0) as u32)
    }

    /// Encode image as lossy WebP
    fn encode_webp(&self, img: &DynamicImage) -> Result<Bytes, PreviewError> {
        // libwebp only takes 8-bit RGB or RGBA
        let normalized = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let encoder = webp::Encoder::from_image(&normalized)
            .map_err(|e| PreviewError::Encode(e.to_string()))?;
        // libwebp caps each side at 16383 px; the height is not bounded here
        let encoded = encoder
            .encode_simple(false, self.config.quality)
            .map_err(|e| PreviewError::Encode(format!("{:?}", e)))?;

        Ok(Bytes::copy_from_slice(&encoded))
    }
}

/// Decode image bytes and rotate/flip the pixels per the EXIF orientation tag
fn decode_oriented(data: &[u8]) -> Result<DynamicImage, PreviewError> {
    let mut decoder = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PreviewError::Decode(e.to_string()))?
        .into_decoder()
        .map_err(|e| PreviewError::Decode(e.to_string()))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| PreviewError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);

    Ok(img)
}
