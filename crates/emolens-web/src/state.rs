//! Application state.

use std::sync::Arc;

use emolens_analysis::AnalysisClient;
use emolens_storage::BlobClient;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiResult;

/// Shared application state.
///
/// Read-only after startup; submissions share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<BlobClient>,
    pub analysis: Arc<AnalysisClient>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: AppConfig) -> ApiResult<Self> {
        let storage = BlobClient::new(config.storage.clone()).await?;
        let analysis = AnalysisClient::new(config.analysis.clone())?;
        info!(bucket = storage.bucket(), folder = %config.upload.folder, "Clients initialized");

        Ok(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            analysis: Arc::new(analysis),
        })
    }
}
