//! Client for the remote video analysis service.
//!
//! The service is opaque: it receives a media URL, runs one of several
//! pipelines and answers with a JSON `result` mapping. This crate sends
//! the request, classifies failures and fetches the combined HTML
//! visualization the service produces.

pub mod client;
pub mod error;

pub use client::{parse_response, AnalysisClient, AnalysisConfig};
pub use error::{ServiceError, ServiceResult};
