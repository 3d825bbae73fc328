//! Observability infrastructure for drivex.
//!
//! This module provides:
//! - Structured logging configuration
//! - Prometheus metrics endpoint and recording helpers

mod logging;
mod metrics;

pub use logging::{init_logging, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_batch_items, record_extract_request, MetricsError,
    MetricsState,
};
