//! Prometheus metrics for image-service.
//!
//! Exposes upload, preview and download collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Encoder, Histogram,
    IntCounterVec, IntGauge, TextEncoder,
};

use crate::error::{AppError, Result};

lazy_static! {
    /// Uploaded files segmented by reported status (success/error).
    pub static ref UPLOAD_FILES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "image_upload_files_total",
        "Uploaded files segmented by outcome status",
        &["status"]
    )
    .expect("failed to register image_upload_files_total");

    /// Preview generation attempts segmented by result.
    pub static ref PREVIEW_GENERATION_TOTAL: IntCounterVec = register_int_counter_vec!(
        "image_preview_generation_total",
        "Preview generation attempts segmented by result",
        &["result"]
    )
    .expect("failed to register image_preview_generation_total");

    pub static ref PREVIEW_GENERATION_DURATION_SECONDS: Histogram = register_histogram!(
        "image_preview_generation_duration_seconds",
        "Time spent reading, processing and storing one preview"
    )
    .expect("failed to register image_preview_generation_duration_seconds");

    /// Download requests segmented by gate decision (admitted/rejected/not_found).
    pub static ref DOWNLOAD_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "image_download_requests_total",
        "Download requests segmented by admission decision",
        &["result"]
    )
    .expect("failed to register image_download_requests_total");

    pub static ref ACTIVE_DOWNLOADS: IntGauge = register_int_gauge!(
        "image_active_downloads",
        "Download streams currently in flight"
    )
    .expect("failed to register image_active_downloads");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> Result<HttpResponse> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| AppError::Internal(format!("Failed to encode metrics: {}", err)))?;

    Ok(HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer))
}
