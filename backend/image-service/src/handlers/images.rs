/// Image handlers - listing, gated downloads and static originals/previews
use actix_web::http::header::{
    CacheControl, CacheDirective, Charset, ContentDisposition, DispositionParam, DispositionType,
    ExtendedValue,
};
use actix_web::{web, HttpResponse};
use mime::Mime;
use std::path::Path;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::models::ListImagesQuery;
use crate::services::download;
use crate::AppState;

/// One year, for immutable-by-name static files
const STATIC_MAX_AGE_SECS: u32 = 31_536_000;

/// `GET /api/imgs?page=&limit=`
pub async fn list_images(
    state: web::Data<AppState>,
    query: web::Query<ListImagesQuery>,
) -> Result<HttpResponse> {
    let page = state.listing.list(query.page(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// `GET /api/download/{file}`
pub async fn download_image(
    state: web::Data<AppState>,
    file: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = file.into_inner();
    let download = download::admit(&state.downloads, &state.store, &filename).await?;

    Ok(HttpResponse::Ok()
        .content_type(mime_for_extension(&download.filename))
        .insert_header(attachment_disposition(&download.filename))
        .no_chunking(download.size)
        .streaming(download.stream))
}

/// `attachment` disposition; non-ASCII names get an ASCII fallback plus `filename*`
pub fn attachment_disposition(filename: &str) -> ContentDisposition {
    if filename.is_ascii() {
        return ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        };
    }

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(fallback),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: filename.as_bytes().to_vec(),
            }),
        ],
    }
}

/// `GET /imgs/{file}`
pub async fn serve_original(
    state: web::Data<AppState>,
    file: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = file.into_inner();
    let path = state
        .store
        .original_path(&filename)
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;
    serve_static(&path, mime_for_extension(&filename)).await
}

/// `GET /preview/{file}`; previews are always WebP whatever their extension
pub async fn serve_preview(
    state: web::Data<AppState>,
    file: web::Path<String>,
) -> Result<HttpResponse> {
    let path = state
        .store
        .preview_path(&file)
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;
    serve_static(&path, image_webp()).await
}

async fn serve_static(path: &Path, content_type: Mime) -> Result<HttpResponse> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()))
        }
        Err(err) => return Err(err.into()),
    };
    let meta = file.metadata().await?;
    if !meta.is_file() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(STATIC_MAX_AGE_SECS),
        ]))
        .no_chunking(meta.len())
        .streaming(ReaderStream::new(file)))
}

fn image_webp() -> Mime {
    "image/webp"
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Content type guessed from the filename extension
pub fn mime_for_extension(filename: &str) -> Mime {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => image_webp(),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
