/// HTTP handlers for image-related endpoints
///
/// This module contains handlers for:
/// - Uploads: public and admin batch uploads
/// - Images: listing, gated downloads, static originals and previews
/// - Health and the admin page
pub mod admin;
pub mod health;
pub mod images;
pub mod uploads;

use actix_web::web;

use crate::metrics;
use crate::middleware::UploadAuth;

// Explicit re-exports to avoid ambiguity
pub use admin::admin_page;
pub use health::health;
pub use images::{download_image, list_images, serve_original, serve_preview};
pub use uploads::{admin_upload_images, upload_images};

/// Register every route. Both upload endpoints sit behind the same `UploadAuth`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth: UploadAuth) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/admin", web::get().to(admin_page))
        .service(
            web::resource("/api/upload")
                .wrap(auth.clone())
                .route(web::post().to(upload_images)),
        )
        .service(
            web::resource("/api/admin/upload")
                .wrap(auth)
                .route(web::post().to(admin_upload_images)),
        )
        .route("/api/imgs", web::get().to(list_images))
        .route("/api/download/{file}", web::get().to(download_image))
        .route("/imgs/{file}", web::get().to(serve_original))
        .route("/preview/{file}", web::get().to(serve_preview));
}
