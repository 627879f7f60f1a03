/// Upload handlers - HTTP endpoints for batch image uploads
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bytes::BytesMut;
use futures_util::StreamExt;

use crate::error::{AppError, Result};
use crate::models::UploadResponse;
use crate::services::storage::validate_filename;
use crate::services::IncomingFile;
use crate::AppState;

/// Multipart field carrying the files
pub const UPLOAD_FIELD: &str = "images";

/// Per-request batch limits
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    pub max_files: usize,
    pub max_file_size: usize,
}

/// Public upload endpoint (`POST /api/upload`)
pub async fn upload_images(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let limits = BatchLimits {
        max_files: state.upload.public_max_files,
        max_file_size: state.upload.max_file_size,
    };
    handle_batch(&state, payload, limits).await
}

/// Admin upload endpoint (`POST /api/admin/upload`)
pub async fn admin_upload_images(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let limits = BatchLimits {
        max_files: state.upload.admin_max_files,
        max_file_size: state.upload.max_file_size,
    };
    handle_batch(&state, payload, limits).await
}

async fn handle_batch(state: &AppState, payload: Multipart, limits: BatchLimits) -> Result<HttpResponse> {
    // The whole batch is validated before the first write
    let files = read_batch(payload, limits).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    tracing::info!(files = files.len(), "processing upload batch");
    let outcomes = state.pipeline.process(files).await;

    Ok(HttpResponse::Ok().json(UploadResponse::from(outcomes)))
}

/// Buffer every file of the `images` field, enforcing type, name, count and size.
pub async fn read_batch(mut payload: Multipart, limits: BatchLimits) -> Result<Vec<IncomingFile>> {
    let mut files = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field = field?;

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        // Non-file form fields and files under other names are drained and ignored
        let Some(filename) = filename.filter(|_| field.name() == Some(UPLOAD_FIELD)) else {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        };

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::ValidationError(format!(
                "Only image files are allowed: {} ({})",
                filename,
                if content_type.is_empty() { "unknown type" } else { content_type.as_str() }
            )));
        }

        validate_filename(&filename)?;

        if files.len() >= limits.max_files {
            return Err(AppError::BadRequest(format!(
                "Too many files, at most {} per request",
                limits.max_files
            )));
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > limits.max_file_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds the {} byte limit",
                    filename, limits.max_file_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        files.push(IncomingFile {
            filename,
            content_type,
            data: data.freeze(),
        });
    }

    Ok(files)
}
