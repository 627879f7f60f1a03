//! Preview generation
//!
//! This module provides preview generation capabilities:
//! - Image processor for orienting, resizing and WebP encoding
//! - Generator for reading originals and storing previews

pub mod generator;
pub mod processor;

pub use generator::PreviewGenerator;
pub use processor::{PreviewConfig, PreviewError, PreviewProcessor, PreviewResult};
