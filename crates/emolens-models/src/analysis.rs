//! Analysis service request and response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to an analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Resolvable URL of the uploaded video
    pub media_url: String,
}

impl AnalysisRequest {
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
        }
    }
}

/// Successful response from an analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: AnalysisResult,
    /// Service-side processing time; 0 when absent or `null`
    #[serde(default, deserialize_with = "zero_if_null")]
    pub run_time_ms: f64,
}

/// The `result` mapping of an analysis response.
///
/// Two keys are distinguished; everything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Link to the annotated output video
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty_string")]
    pub result_video_path: Option<String>,
    /// Link to the combined HTML visualization
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty_string")]
    pub combined_html_path: Option<String>,
    /// All remaining keys, ordered by name
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Treat `null`, empty strings and non-string values as absent.
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
