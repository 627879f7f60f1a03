/// Configuration management for image-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Size limit for a single uploaded file (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub download: DownloadConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for every URL handed back to clients
    pub base_url: String,
    pub json_logs: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    pub primary_origin: String,
    /// Extra origins from `ALLOW_ON`
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub images_dir: PathBuf,
    pub previews_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UploadConfig {
    pub secret: Option<String>,
    pub max_file_size: usize,
    pub public_max_files: usize,
    pub admin_max_files: usize,
    pub preview_failure_is_error: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DownloadConfig {
    pub max_downloads: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            secret: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            public_max_files: 5,
            admin_max_files: 10,
            preview_failure_is_error: false,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { max_downloads: 200 }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("PORT", 5000u16)?;

        Ok(Config {
            app: AppConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                base_url: std::env::var("BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| format!("http://localhost:{}", port)),
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: CorsConfig {
                primary_origin: std::env::var("PRIMARY_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                allowed_origins: parse_origins(&std::env::var("ALLOW_ON").unwrap_or_default()),
            },
            storage: StorageConfig {
                images_dir: std::env::var("IMAGES_DIR")
                    .unwrap_or_else(|_| "imgs".to_string())
                    .into(),
                previews_dir: std::env::var("PREVIEWS_DIR")
                    .unwrap_or_else(|_| "preview".to_string())
                    .into(),
            },
            upload: UploadConfig {
                secret: std::env::var("UPLOAD_SECRET")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                preview_failure_is_error: parse_var("PREVIEW_FAILURE_IS_ERROR", false)?,
                ..UploadConfig::default()
            },
            download: DownloadConfig {
                max_downloads: parse_var("MAX_DOWNLOADS", 200usize)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        _ => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
