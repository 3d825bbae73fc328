//! API middleware.
//!
//! Includes:
//! - CORS configuration
//! - Request ID generation
//! - Request logging
//! - Metrics collection

mod logging;
mod metrics;
mod request_id;

pub use logging::RequestLoggingLayer;
pub use metrics::{MetricsLayer, RequestMetrics};
pub use request_id::{RequestIdLayer, REQUEST_ID_HEADER};

use axum::http::{header::CONTENT_TYPE, Method};
use tower_http::cors::{Any, CorsLayer};

/// CORS layer for the extraction endpoint.
///
/// Any origin may call the service without an allow-listing step; only POST
/// (the endpoint itself) and OPTIONS (preflight) are advertised, with
/// `content-type` as the sole request header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
