//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "coach_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "coach_http_request_duration_seconds";

    // Processing metrics
    pub const VIDEOS_PROCESSED_TOTAL: &str = "coach_videos_processed_total";
    pub const ANALYSIS_FAILURES_TOTAL: &str = "coach_analysis_failures_total";
    pub const TRACKING_SAMPLES_TOTAL: &str = "coach_tracking_samples_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one completed video processing run.
pub fn record_video_processed(mock: bool, tracking_samples: usize) {
    let labels = [("analysis", if mock { "mock" } else { "gemini" })];
    counter!(names::VIDEOS_PROCESSED_TOTAL, &labels).increment(1);
    counter!(names::TRACKING_SAMPLES_TOTAL).increment(tracking_samples as u64);
}

/// Record a failed analysis call.
pub fn record_analysis_failure() {
    counter!(names::ANALYSIS_FAILURES_TOTAL).increment(1);
}

/// Middleware recording per-request metrics.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Collapse unknown paths to keep label cardinality bounded.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/process-video" | "/health" | "/metrics" => path.to_string(),
        _ => "other".to_string(),
    }
}
