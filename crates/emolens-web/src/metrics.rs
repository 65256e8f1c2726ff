//! Prometheus metrics for the web server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "emolens_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "emolens_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "emolens_http_requests_in_flight";

    // Workflow metrics
    pub const UPLOAD_DURATION_SECONDS: &str = "emolens_upload_duration_seconds";
    pub const UPLOAD_BYTES_TOTAL: &str = "emolens_upload_bytes_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "emolens_analysis_duration_seconds";
    pub const WORKFLOW_OUTCOMES_TOTAL: &str = "emolens_workflow_outcomes_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished upload.
pub fn record_upload(size_bytes: u64, duration_secs: f64) {
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
    counter!(names::UPLOAD_BYTES_TOTAL).increment(size_bytes);
}

/// Record the duration of one analysis request, successful or not.
pub fn record_analysis_duration(endpoint: &str, duration_secs: f64) {
    let labels = [("endpoint", endpoint.to_string())];
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record where a workflow ended and how.
pub fn record_workflow_outcome(stage: &str, outcome: &str) {
    let labels = [("stage", stage.to_string()), ("outcome", outcome.to_string())];
    counter!(names::WORKFLOW_OUTCOMES_TOTAL, &labels).increment(1);
}

/// Metrics middleware for HTTP requests.
///
/// Labels use the route template, so unknown paths collapse into one series.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
