//! Prometheus metrics infrastructure.
//!
//! Metrics go through the `metrics` facade with
//! `metrics-exporter-prometheus` for exposition.
//!
//! # Metrics Exposed
//!
//! - `drivex_http_requests_total` - Total HTTP requests by method, path, status class
//! - `drivex_http_request_duration_seconds` - Request duration histogram
//! - `drivex_extract_requests_total` - Extraction requests by mode and outcome
//! - `drivex_extract_items_total` - Batch elements classified, by outcome

use std::sync::Arc;

use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Shared state containing the Prometheus handle for metrics rendering.
#[derive(Clone)]
pub struct MetricsState {
    handle: Arc<PrometheusHandle>,
}

impl MetricsState {
    /// Creates a new metrics state with the given Prometheus handle.
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Renders the current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Error type for metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: recorder already installed")]
    AlreadyInstalled,
}

/// Initializes the Prometheus metrics recorder.
///
/// Must be called once at application startup before any metrics are
/// recorded. Returns a handle used to render metrics for the `/metrics`
/// endpoint.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    register_default_metrics();

    Ok(MetricsState::new(handle))
}

/// Describes the metrics this service emits.
///
/// Recording happens in the middleware and handlers.
fn register_default_metrics() {
    metrics::describe_counter!("drivex_http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "drivex_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "drivex_extract_requests_total",
        "Total number of extraction requests by mode and outcome"
    );
    metrics::describe_counter!(
        "drivex_extract_items_total",
        "Total number of batch elements classified, by outcome"
    );
}

/// Prometheus exposition format content type.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.render())
}

/// Records an extraction request.
///
/// # Arguments
///
/// * `mode` - "single" or "batch"
/// * `outcome` - "found"/"not_found" for single mode, "completed" for batch
pub fn record_extract_request(mode: &str, outcome: &str) {
    let labels = [
        ("mode", mode.to_string()),
        ("outcome", outcome.to_string()),
    ];
    metrics::counter!("drivex_extract_requests_total", &labels).increment(1);
}

/// Records per-element batch outcomes.
pub fn record_batch_items(succeeded: u64, failed: u64) {
    if succeeded > 0 {
        metrics::counter!("drivex_extract_items_total", &[("outcome", "succeeded".to_string())])
            .increment(succeeded);
    }
    if failed > 0 {
        metrics::counter!("drivex_extract_items_total", &[("outcome", "failed".to_string())])
            .increment(failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only one recorder can be installed per process, so these tests build
    // a local recorder instead of installing the global one.

    #[test]
    fn test_metrics_state_can_be_cloned() {
        let builder = PrometheusBuilder::new();
        let handle = builder.build_recorder().handle();
        let state = MetricsState::new(handle);
        let _cloned = state.clone();
    }

    #[test]
    fn test_metrics_state_render_returns_string() {
        let builder = PrometheusBuilder::new();
        let handle = builder.build_recorder().handle();
        let state = MetricsState::new(handle);
        let _output = state.render();
    }

    #[test]
    fn test_recording_without_recorder_does_not_panic() {
        record_extract_request("single", "found");
        record_extract_request("batch", "completed");
        record_batch_items(2, 1);
        record_batch_items(0, 0);
    }
}
