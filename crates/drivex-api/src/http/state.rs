//! Application state for HTTP handlers.

use std::sync::Arc;

use drivex_domain::{IdExtractor, DEFAULT_MIN_IDENTIFIER_LEN};
use drivex_server::handlers::batch::BatchExtractHandler;

/// Application state shared across all HTTP handlers.
///
/// The extractor and the batch handler built over it are the only
/// dependencies; both are read-only after construction, so the state is
/// freely cloneable across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    /// The extraction rule with the configured length policy.
    pub extractor: Arc<IdExtractor>,
    /// The batch extraction handler.
    pub batch_handler: Arc<BatchExtractHandler>,
}

impl AppState {
    /// Creates application state with the default length policy.
    pub fn new() -> Self {
        Self::with_min_identifier_len(DEFAULT_MIN_IDENTIFIER_LEN)
    }

    /// Creates application state with a custom minimum identifier length.
    pub fn with_min_identifier_len(min_len: usize) -> Self {
        let extractor = Arc::new(IdExtractor::new(min_len));
        let batch_handler = Arc::new(BatchExtractHandler::new(Arc::clone(&extractor)));
        Self {
            extractor,
            batch_handler,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
