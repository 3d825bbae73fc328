//! Data types for batch extraction.

use serde_json::Value;

/// A batch extraction request: the raw elements of the inbound sequence.
///
/// Elements are arbitrary JSON values; non-string elements are legal and
/// simply fail extraction individually.
#[derive(Debug, Clone)]
pub struct BatchExtractRequest {
    /// The elements to classify, in request order.
    pub items: Vec<Value>,
}

impl BatchExtractRequest {
    /// Creates a new batch extraction request.
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }
}

/// Outcome for a single batch element.
///
/// Invariant: `identifier` is `Some` exactly when `error` is `None`. The
/// constructors are the only way these fields are populated.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    /// Position of the element in the input sequence.
    pub index: usize,
    /// The original input element, unmodified.
    pub input: Value,
    /// The extracted identifier, if one was found.
    pub identifier: Option<String>,
    /// Failure description when no identifier was extracted.
    pub error: Option<String>,
}

impl ItemOutcome {
    /// Outcome for an element that yielded an identifier.
    pub fn found(index: usize, input: Value, identifier: String) -> Self {
        Self {
            index,
            input,
            identifier: Some(identifier),
            error: None,
        }
    }

    /// Outcome for an element that yielded nothing.
    pub fn not_found(index: usize, input: Value, error: impl Into<String>) -> Self {
        Self {
            index,
            input,
            identifier: None,
            error: Some(error.into()),
        }
    }

    /// Whether this element produced an identifier.
    pub fn succeeded(&self) -> bool {
        self.identifier.is_some()
    }
}

/// Aggregate counts over a batch.
///
/// `total == succeeded + failed` always holds, and `total` equals the input
/// sequence length, including zero for an empty sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Response from a batch extraction.
#[derive(Debug, Clone)]
pub struct BatchExtractResponse {
    /// One outcome per input element, in the same order as the request.
    pub results: Vec<ItemOutcome>,
    /// Aggregate counts over `results`.
    pub summary: BatchSummary,
}
