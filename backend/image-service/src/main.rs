/// Image Service - HTTP Server
///
/// Handles image uploads, preview generation, listing and downloads.
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use image_service::handlers;
use image_service::middleware::{RequestTiming, UploadAuth};
use image_service::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.app.json_logs);

    tracing::info!("Starting image-service v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(&config);
    state
        .store
        .ensure_dirs()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create storage directories: {e}"))?;

    tracing::info!(
        images_dir = %state.store.images_dir().display(),
        previews_dir = %state.store.previews_dir().display(),
        max_downloads = state.downloads.max_downloads(),
        "storage ready"
    );

    let auth = UploadAuth::new(config.upload.secret.clone());
    if !auth.is_enabled() {
        tracing::warn!("UPLOAD_SECRET not set; upload endpoints are open");
    }

    let state = web::Data::new(state);
    let cors_config = config.cors.clone();
    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    tracing::info!("Image Service starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default().allowed_origin(&cors_config.primary_origin);
        for origin in &cors_config.allowed_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let auth = auth.clone();
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestTiming)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| handlers::configure_routes(cfg, auth))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    tracing::info!("image-service shutting down");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
