/// Health handler
use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::models::HealthResponse;
use crate::AppState;

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        active_downloads: state.downloads.active(),
    })
}
