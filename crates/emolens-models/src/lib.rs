//! Shared data models for emolens.
//!
//! This crate provides Serde-serializable types for:
//! - The closed set of analysis endpoints
//! - Object keys for uploaded videos
//! - Analysis service requests and responses
//! - Display-only cost estimates

pub mod analysis;
pub mod cost;
pub mod endpoint;
pub mod object_key;

// Re-export common types
pub use analysis::{AnalysisRequest, AnalysisResponse, AnalysisResult};
pub use cost::{CostEstimate, FIXED_OVERHEAD_SECONDS, PRICE_PER_SECOND};
pub use endpoint::{Endpoint, EndpointParseError, EndpointUrls};
pub use object_key::{is_allowed_video, sanitize_file_name, ObjectKey, ALLOWED_VIDEO_EXTENSIONS};
