//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;

use drivex_server::handlers::batch::{BatchExtractRequest, BatchExtractResponse, ItemOutcome};

use super::state::AppState;
use crate::middleware::cors_layer;
use crate::observability::{
    metrics_handler, record_batch_items, record_extract_request, MetricsState,
};

/// Default request body size limit (1MB).
/// This prevents memory exhaustion from oversized payloads.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body extractor matching the service's transport contract.
///
/// The raw body is drained exactly once and decoded manually:
/// - an empty body is treated as an empty object, so shape validation can
///   report the missing field instead of a decode failure,
/// - a body that cannot be decoded as JSON is an opaque server error; the
///   decode detail is logged for operators and never returned to the caller,
/// - a body over the size limit keeps its 413 status.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: serde::de::DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("request body exceeds the size limit")
            } else {
                error!("failed to read request body: {}", rejection.body_text());
                ApiError::internal_error("failed to read request body")
            }
        })?;

        if bytes.is_empty() {
            return Ok(JsonBody(T::default()));
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(JsonBody(value)),
            Err(err) => {
                // Full detail stays in the log; the caller sees a generic error.
                error!("failed to decode request body as JSON: {}", err);
                Err(ApiError::internal_error("failed to decode request body"))
            }
        }
    }
}

// ============================================================
// Error Handling
// ============================================================

/// Error codes returned by the extraction API.
///
/// Each code maps to a specific HTTP status code in the `IntoResponse`
/// implementation on `ApiError`:
///
/// - `identifier_not_found` → 404: well-formed single request, no
///   identifier extractable
/// - `validation_error` → 400: neither a `urls` array nor a `url` string
///   was supplied
/// - `method_not_allowed` → 405: method other than POST/OPTIONS
/// - `payload_too_large` → 413: body exceeds the size limit
/// - `internal_error` → 500: body unreadable or undecodable; detail is
///   logged, never returned
pub mod error_codes {
    /// No identifier could be located in a well-formed single request.
    pub const IDENTIFIER_NOT_FOUND: &str = "identifier_not_found";
    /// Request shape error: neither a `urls` array nor a `url` string.
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Request used a method other than POST or OPTIONS.
    pub const METHOD_NOT_ALLOWED: &str = "method_not_allowed";
    /// Request body exceeds the configured size limit.
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Unexpected failure; details are logged, never returned.
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response format.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an identifier not found error (404).
    pub fn identifier_not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::IDENTIFIER_NOT_FOUND, message)
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a method not allowed error (405).
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(error_codes::METHOD_NOT_ALLOWED, message)
    }

    /// Creates a payload too large error (413).
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(error_codes::PAYLOAD_TOO_LARGE, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            IDENTIFIER_NOT_FOUND => StatusCode::NOT_FOUND,
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            METHOD_NOT_ALLOWED => StatusCode::METHOD_NOT_ALLOWED,
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = (status, Json(self)).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            // Advertise what the endpoint accepts.
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"));
        }
        response
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Router Construction
// ============================================================

fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/extract",
        post(extract)
            .options(extract_options)
            .fallback(method_not_allowed),
    )
}

/// Creates the HTTP router with the extraction endpoint.
///
/// Applies the default body size limit (1MB) and the CORS layer.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
///
/// # Arguments
///
/// * `state` - Application state with the configured extractor
/// * `body_limit` - Maximum request body size in bytes
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    let shared_state = Arc::new(state);
    api_routes()
        .route("/health", get(health_check))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
}

/// Creates the HTTP router with observability endpoints.
///
/// This includes the extraction endpoint plus:
/// - `/metrics` - Prometheus metrics endpoint
/// - `/health` - Basic health check
///
/// Request logging, request IDs, and HTTP metrics are layered on; CORS wraps
/// everything so every response carries the cross-origin headers.
pub fn create_router_with_observability(state: AppState, metrics_state: MetricsState) -> Router {
    create_router_with_observability_and_limit(state, metrics_state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with observability endpoints and a custom body
/// size limit.
pub fn create_router_with_observability_and_limit(
    state: AppState,
    metrics_state: MetricsState,
    body_limit: usize,
) -> Router {
    use crate::middleware::{MetricsLayer, RequestIdLayer, RequestLoggingLayer, RequestMetrics};

    let shared_state = Arc::new(state);

    // API routes get the body limit; observability routes do not need one.
    let api_router = api_routes()
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit));

    let observability_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .with_state(metrics_state);

    let request_metrics = Arc::new(RequestMetrics::new());

    // Layers run outermost-last: CORS wraps everything, the request ID is
    // assigned before metrics and logging observe the request.
    api_router
        .merge(observability_router)
        .layer(RequestLoggingLayer::new())
        .layer(MetricsLayer::new(request_metrics))
        .layer(RequestIdLayer::new())
        .layer(cors_layer())
}

// ============================================================
// Health Check
// ============================================================

/// Basic health check - returns 200 if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Extraction Endpoint
// ============================================================

/// Request body for the extraction endpoint.
///
/// Both fields are kept as raw JSON values: shape resolution (array vs.
/// string vs. anything else) is the adapter's job, not the deserializer's,
/// so a wrongly-typed field must not abort decoding.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractRequestBody {
    /// Single-mode input: one URL string.
    #[serde(default)]
    pub url: Option<Value>,
    /// Batch-mode input: a sequence of arbitrary values.
    #[serde(default)]
    pub urls: Option<Value>,
}

/// Response for a successful single extraction.
#[derive(Debug, Serialize)]
pub struct SingleExtractResponse {
    pub drive_id: String,
}

/// One element of a batch response.
#[derive(Debug, Serialize)]
pub struct BatchItemBody {
    pub index: usize,
    pub input: Value,
    pub drive_id: Option<String>,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl From<ItemOutcome> for BatchItemBody {
    fn from(outcome: ItemOutcome) -> Self {
        let succeeded = outcome.succeeded();
        Self {
            index: outcome.index,
            input: outcome.input,
            drive_id: outcome.identifier,
            succeeded,
            error: outcome.error,
        }
    }
}

/// Aggregate counts for a batch response.
#[derive(Debug, Serialize)]
pub struct BatchSummaryBody {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Response for a batch extraction.
#[derive(Debug, Serialize)]
pub struct BatchExtractResponseBody {
    pub results: Vec<BatchItemBody>,
    pub summary: BatchSummaryBody,
}

impl From<BatchExtractResponse> for BatchExtractResponseBody {
    fn from(response: BatchExtractResponse) -> Self {
        Self {
            results: response
                .results
                .into_iter()
                .map(BatchItemBody::from)
                .collect(),
            summary: BatchSummaryBody {
                total: response.summary.total,
                succeeded: response.summary.succeeded,
                failed: response.summary.failed,
            },
        }
    }
}

/// The resolved shape of an extraction request.
enum RequestMode {
    Single(String),
    Batch(Vec<Value>),
    Invalid,
}

/// Resolves the request shape, first match wins:
/// 1. `urls` present and an array → batch,
/// 2. `url` present and a string → single,
/// 3. anything else → invalid.
///
/// A `urls` field of any other type is ignored rather than rejected so the
/// `url` field can still be consulted.
fn resolve_mode(body: ExtractRequestBody) -> RequestMode {
    if let Some(Value::Array(items)) = body.urls {
        return RequestMode::Batch(items);
    }
    if let Some(Value::String(url)) = body.url {
        return RequestMode::Single(url);
    }
    RequestMode::Invalid
}

async fn extract(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<ExtractRequestBody>,
) -> ApiResult<Response> {
    match resolve_mode(body) {
        RequestMode::Batch(items) => Ok(run_batch(&state, items).into_response()),
        RequestMode::Single(url) => Ok(Json(run_single(&state, &url)?).into_response()),
        RequestMode::Invalid => Err(ApiError::validation_error(
            "request must supply a `urls` array or a `url` string",
        )),
    }
}

fn run_single(state: &AppState, url: &str) -> ApiResult<SingleExtractResponse> {
    match state.extractor.extract(url) {
        Some(identifier) => {
            record_extract_request("single", "found");
            Ok(SingleExtractResponse {
                drive_id: identifier.to_string(),
            })
        }
        None => {
            record_extract_request("single", "not_found");
            Err(ApiError::identifier_not_found(
                "no drive identifier found in url",
            ))
        }
    }
}

fn run_batch(state: &AppState, items: Vec<Value>) -> Json<BatchExtractResponseBody> {
    let response = state.batch_handler.run(BatchExtractRequest::new(items));

    record_extract_request("batch", "completed");
    record_batch_items(
        response.summary.succeeded as u64,
        response.summary.failed as u64,
    );

    Json(BatchExtractResponseBody::from(response))
}

/// Unconditional empty success for non-preflight OPTIONS requests.
///
/// Preflight requests carry `Access-Control-Request-Method` and are answered
/// by the CORS layer before reaching this handler.
async fn extract_options() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unsupported methods on the extraction endpoint.
async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("only POST is accepted on this endpoint")
}
