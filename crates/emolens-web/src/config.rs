//! Application configuration.

use std::path::PathBuf;

use emolens_analysis::AnalysisConfig;
use emolens_storage::StorageConfig;

use crate::error::ApiResult;

/// Default request body limit: 1 GiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Where submitted files go before and after upload.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Folder prefix of the object key
    pub folder: String,
    /// Root under which per-request temporary directories are created
    pub temp_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: "videos".to_string(),
            temp_dir: PathBuf::from("./temp"),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            folder: std::env::var("UPLOAD_FOLDER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.folder),
            temp_dir: std::env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
        }
    }
}

/// Everything the server needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ApiConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Create config from environment variables.
    ///
    /// Fails when a required storage or analysis variable is missing.
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            server: ApiConfig::from_env(),
            storage: StorageConfig::from_env()?,
            analysis: AnalysisConfig::from_env()?,
            upload: UploadConfig::from_env(),
        })
    }
}
