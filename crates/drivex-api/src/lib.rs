//! drivex-api: HTTP API layer
//!
//! This crate provides the HTTP surface including:
//! - The `/extract` endpoint via Axum
//! - Middleware (CORS, request IDs, logging, metrics)
//! - Observability bootstrap (structured logging, Prometheus metrics)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 drivex-api                   │
//! ├─────────────────────────────────────────────┤
//! │  http/          - HTTP endpoints            │
//! │  middleware/    - CORS, logging, metrics    │
//! │  observability/ - Logging, metrics setup    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod http;
pub mod middleware;
pub mod observability;
