//! Integration Tests: Upload endpoints
//!
//! Coverage:
//! - Originals stored byte-for-byte, previews downsized WebP
//! - Overwrite semantics for repeated filenames
//! - Whole-batch rejection for non-image, oversize, too many, and bad names
//! - Shared-secret policy applied to both upload endpoints

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use common::{multipart_body, png_bytes, Part, TestContext};
use image::GenericImageView;
use serde_json::Value;

fn upload_request(uri: &str, parts: &[Part<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart_body(parts);
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn upload_stores_original_and_preview() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let original = png_bytes(1600, 400);

    let resp = test::call_service(
        &app,
        upload_request("/api/upload", &[Part::image("wide.png", &original)]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalFiles"], 1);
    assert_eq!(body["results"][0]["filename"], "wide.png");
    assert_eq!(body["results"][0]["status"], "success");
    assert_eq!(body["results"][0]["size"], original.len());

    // original is byte-identical
    let resp = test::call_service(&app, test::TestRequest::get().uri("/imgs/wide.png").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let stored = test::read_body(resp).await;
    assert_eq!(stored.as_ref(), original.as_slice());

    // preview is WebP, at most 1000 wide, cached for a year
    let resp = test::call_service(&app, test::TestRequest::get().uri("/preview/wide.png").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/webp");
    let cache_control = resp
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cache_control.contains("public"));
    assert!(cache_control.contains("max-age=31536000"));

    let preview = test::read_body(resp).await;
    assert_eq!(image::guess_format(&preview).unwrap(), image::ImageFormat::WebP);
    let decoded = image::load_from_memory(&preview).unwrap();
    assert_eq!(decoded.dimensions(), (1000, 250));
}

#[actix_web::test]
async fn second_upload_with_same_name_overwrites() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let first = png_bytes(10, 10);
    let second = png_bytes(20, 20);

    for data in [&first, &second] {
        let resp = test::call_service(
            &app,
            upload_request("/api/upload", &[Part::image("same.png", data)]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(ctx.stored_count(), 1);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/imgs/same.png").to_request()).await;
    assert_eq!(test::read_body(resp).await.as_ref(), second.as_slice());
}

#[actix_web::test]
async fn non_image_rejects_whole_batch_before_writing() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let png = png_bytes(4, 4);

    let parts = [
        Part::image("ok.png", &png),
        Part {
            field: "images",
            filename: "notes.txt",
            content_type: "text/plain",
            data: b"hello",
        },
    ];
    let resp = test::call_service(&app, upload_request("/api/upload", &parts).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_count(), 0);
}

#[actix_web::test]
async fn empty_batch_is_bad_request() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;

    // form carries only a text field, so no file reaches the batch
    let parts = [Part::text("note", "nothing attached")];
    let resp = test::call_service(&app, upload_request("/api/upload", &parts).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("No files uploaded"));
    assert_eq!(ctx.stored_count(), 0);
}

#[actix_web::test]
async fn body_without_parts_is_bad_request() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;

    let resp = test::call_service(&app, upload_request("/api/upload", &[]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_count(), 0);
}

#[actix_web::test]
async fn files_under_other_fields_are_ignored() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let png = png_bytes(4, 4);

    let parts = [Part {
        field: "attachments",
        filename: "a.png",
        content_type: "image/png",
        data: &png,
    }];
    let resp = test::call_service(&app, upload_request("/api/upload", &parts).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_count(), 0);
}

#[actix_web::test]
async fn public_endpoint_limits_batch_to_five() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let png = png_bytes(2, 2);
    let names = ["1.png", "2.png", "3.png", "4.png", "5.png", "6.png"];
    let parts: Vec<_> = names.iter().map(|n| Part::image(n, &png)).collect();

    let resp = test::call_service(&app, upload_request("/api/upload", &parts).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_count(), 0);

    // admin endpoint takes up to ten
    let resp = test::call_service(&app, upload_request("/api/admin/upload", &parts).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalFiles"], 6);
    assert_eq!(ctx.stored_count(), 6);
}

#[actix_web::test]
async fn oversize_file_is_payload_too_large() {
    let ctx = TestContext::with_config(|config| config.upload.max_file_size = 64).await;
    let app = test::init_service(ctx.app()).await;
    let big = vec![0u8; 65];

    let resp = test::call_service(
        &app,
        upload_request("/api/upload", &[Part::image("big.png", &big)]).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ctx.stored_count(), 0);
}

#[actix_web::test]
async fn traversal_filename_is_rejected() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;
    let png = png_bytes(2, 2);

    let resp = test::call_service(
        &app,
        upload_request("/api/upload", &[Part::image("../escape.png", &png)]).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_count(), 0);
    assert!(!ctx.dir.path().join("escape.png").exists());
}

#[actix_web::test]
async fn corrupt_image_still_reports_success_without_preview() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.app()).await;

    let resp = test::call_service(
        &app,
        upload_request("/api/upload", &[Part::image("broken.png", b"not really a png")]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["results"][0]["status"], "success");
    assert!(ctx.images_dir().join("broken.png").exists());
    assert!(!ctx.previews_dir().join("broken.png").exists());
}

#[actix_web::test]
async fn corrupt_image_reports_error_when_configured() {
    let ctx = TestContext::with_config(|config| config.upload.preview_failure_is_error = true).await;
    let app = test::init_service(ctx.app()).await;

    let resp = test::call_service(
        &app,
        upload_request("/api/upload", &[Part::image("broken.png", b"not really a png")]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["results"][0]["status"], "error");
    assert!(body["results"][0]["error"].is_string());
}

#[actix_web::test]
async fn secret_applies_to_both_upload_endpoints() {
    let ctx = TestContext::with_config(|config| config.upload.secret = Some("hunter2".to_string())).await;
    let app = test::init_service(ctx.app()).await;
    let png = png_bytes(2, 2);

    for uri in ["/api/upload", "/api/admin/upload"] {
        let resp = test::call_service(&app, upload_request(uri, &[Part::image("a.png", &png)]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri} without token");

        let resp = test::call_service(
            &app,
            upload_request(uri, &[Part::image("a.png", &png)])
                .insert_header((header::AUTHORIZATION, "Bearer wrong"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri} with wrong token");

        let resp = test::call_service(
            &app,
            upload_request(uri, &[Part::image("a.png", &png)])
                .insert_header((header::AUTHORIZATION, "Bearer hunter2"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri} with token");
    }
}
