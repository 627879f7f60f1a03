/// Admin upload page
use actix_web::HttpResponse;

const ADMIN_PAGE: &str = include_str!("../../static/admin.html");

/// `GET /admin`
pub async fn admin_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(ADMIN_PAGE)
}
