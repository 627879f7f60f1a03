//! Shared fixtures for HTTP integration tests

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use image_service::config::{
    AppConfig, Config, CorsConfig, DownloadConfig, StorageConfig, UploadConfig,
};
use image_service::handlers::configure_routes;
use image_service::middleware::UploadAuth;
use image_service::AppState;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

pub const BOUNDARY: &str = "----image-service-test-boundary";
pub const BASE_URL: &str = "http://images.test";

pub struct TestContext {
    pub dir: TempDir,
    pub state: web::Data<AppState>,
    pub auth: UploadAuth,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                base_url: BASE_URL.to_string(),
                json_logs: false,
            },
            cors: CorsConfig {
                primary_origin: "http://localhost:3000".to_string(),
                allowed_origins: Vec::new(),
            },
            storage: StorageConfig {
                images_dir: dir.path().join("imgs"),
                previews_dir: dir.path().join("preview"),
            },
            upload: UploadConfig::default(),
            download: DownloadConfig::default(),
        };
        customize(&mut config);

        let state = AppState::new(&config);
        state.store.ensure_dirs().await.expect("create dirs");

        Self {
            dir,
            state: web::Data::new(state),
            auth: UploadAuth::new(config.upload.secret.clone()),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let auth = self.auth.clone();
        App::new()
            .app_data(self.state.clone())
            .configure(move |cfg| configure_routes(cfg, auth))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dir.path().join("imgs")
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.dir.path().join("preview")
    }

    pub fn stored_count(&self) -> usize {
        std::fs::read_dir(self.images_dir())
            .expect("read imgs")
            .count()
    }
}

/// Encode a solid-color PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 160, 40]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// One file part of a multipart body
pub struct Part<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn image(filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            field: "images",
            filename,
            content_type: "image/png",
            data,
        }
    }

    pub fn text(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            filename: "",
            content_type: "text/plain",
            data: value.as_bytes(),
        }
    }
}

/// Build a `multipart/form-data` body and its content type header value
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        // An empty filename makes a plain form field
        let disposition = if part.filename.is_empty() {
            format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.field)
        } else {
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.filename
            )
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
