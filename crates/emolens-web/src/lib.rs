//! Web front end for video emotion analysis.
//!
//! A single page takes a video, uploads it to object storage, asks one of
//! the analysis endpoints to process it and renders the returned result.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;
pub mod templates;
pub mod workflow;

pub use config::{ApiConfig, AppConfig, UploadConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use workflow::{Notice, NoticeLevel, StagedUpload, Workflow, WorkflowOutcome};
