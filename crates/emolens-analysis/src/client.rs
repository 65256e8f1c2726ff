//! Analysis service HTTP client.

use std::fmt;
use std::time::Duration;

use emolens_models::{AnalysisRequest, AnalysisResponse, Endpoint, EndpointUrls};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};

/// Upper bound for one analysis request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Upper bound for fetching the combined visualization.
pub const DEFAULT_HTML_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies are cut to this many characters before being surfaced.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Configuration for the analysis client.
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Service URL per endpoint
    pub endpoints: EndpointUrls,
    /// Value of the `Authorization` header
    pub api_key: String,
    /// Analysis request timeout
    pub timeout: Duration,
    /// HTML fetch timeout
    pub html_timeout: Duration,
}

impl AnalysisConfig {
    pub fn new(endpoints: EndpointUrls, api_key: impl Into<String>) -> Self {
        Self {
            endpoints,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            html_timeout: DEFAULT_HTML_TIMEOUT,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ServiceError::config(format!("{name} not set")))
        };
        let seconds = |name: &str, default: Duration| {
            parse_timeout(name, std::env::var(name).ok().as_deref(), default)
        };

        Ok(Self {
            endpoints: EndpointUrls {
                face_caption: required("ANALYSIS_URL_FACE_CAPTION")?,
                face_model: required("ANALYSIS_URL_FACE_MODEL")?,
                caption_only: required("ANALYSIS_URL_CAPTION_ONLY")?,
            },
            api_key: required("ANALYSIS_API_KEY")?,
            timeout: seconds("ANALYSIS_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
            html_timeout: seconds("ANALYSIS_HTML_TIMEOUT_SECS", DEFAULT_HTML_TIMEOUT)?,
        })
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("endpoints", &self.endpoints)
            .field("api_key", &"[redacted]")
            .field("timeout", &self.timeout)
            .field("html_timeout", &self.html_timeout)
            .finish()
    }
}

/// Read a timeout in whole seconds, falling back to `default` when unset.
fn parse_timeout(name: &str, raw: Option<&str>, default: Duration) -> ServiceResult<Duration> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| {
                ServiceError::config(format!("{name} must be a number of seconds, got {raw:?}"))
            }),
    }
}

/// Client for the analysis service.
pub struct AnalysisClient {
    http: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> ServiceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("emolens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServiceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(AnalysisConfig::from_env()?)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// URL a request for `endpoint` is sent to.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> &str {
        self.config.endpoints.url(endpoint)
    }

    /// Run one analysis of the media at `media_url`.
    ///
    /// A single POST, no retries. Only a 2xx body that is a JSON object
    /// with a `result` key counts as success.
    pub async fn analyze(&self, endpoint: Endpoint, media_url: &str) -> ServiceResult<AnalysisResponse> {
        let url = self.endpoint_url(endpoint);
        let request = AnalysisRequest::new(media_url);

        debug!(endpoint = %endpoint, "Sending analysis request to {}", url);

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify(e, self.config.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, self.config.timeout))?;

        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Analysis request failed");
            return Err(ServiceError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let parsed = parse_response(&body)?;
        info!(
            endpoint = %endpoint,
            run_time_ms = parsed.run_time_ms,
            "Analysis completed"
        );
        Ok(parsed)
    }

    /// Fetch a text document, typically the combined HTML visualization.
    pub async fn fetch_html(&self, url: &str) -> ServiceResult<String> {
        debug!("Fetching visualization from {}", url);

        let response = self
            .http
            .get(url)
            .timeout(self.config.html_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.config.html_timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, self.config.html_timeout))?;

        if !status.is_success() {
            return Err(ServiceError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        Ok(body)
    }
}

fn classify(error: reqwest::Error, bound: Duration) -> ServiceError {
    if error.is_timeout() {
        ServiceError::Timeout(bound.as_secs())
    } else {
        ServiceError::Network(error)
    }
}

/// Decode an analysis response body.
///
/// The body must be a JSON object carrying a `result` object; anything
/// else is [`ServiceError::UnexpectedShape`].
pub fn parse_response(body: &str) -> ServiceResult<AnalysisResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| ServiceError::unexpected_shape("response body is not JSON"))?;

    match value.get("result") {
        Some(Value::Object(_)) => {}
        Some(_) => return Err(ServiceError::unexpected_shape("`result` is not an object")),
        None => return Err(ServiceError::unexpected_shape("missing `result` key")),
    }

    serde_json::from_value(value).map_err(|e| ServiceError::unexpected_shape(e.to_string()))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
