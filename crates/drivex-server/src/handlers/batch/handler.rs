//! Batch extraction handler implementation.

use std::sync::Arc;

use drivex_domain::IdExtractor;
use serde_json::Value;

use super::types::{BatchExtractRequest, BatchExtractResponse, BatchSummary, ItemOutcome};

/// Failure message for elements that are not strings.
const NOT_A_STRING: &str = "input is not a string";

/// Failure message for strings without a qualifying identifier.
const NO_IDENTIFIER: &str = "no drive identifier found in input";

/// Handler for batch extraction requests.
///
/// Elements are classified strictly in input order: the rule is a single
/// bounded regex scan per element, so result position `i` always corresponds
/// to input position `i` and there is nothing to parallelize.
pub struct BatchExtractHandler {
    /// The extraction rule with the configured length policy.
    extractor: Arc<IdExtractor>,
}

impl BatchExtractHandler {
    /// Creates a new batch extraction handler.
    pub fn new(extractor: Arc<IdExtractor>) -> Self {
        Self { extractor }
    }

    /// Classifies every element of the request.
    ///
    /// Per-element failures are captured in the outcome, never surfaced as an
    /// error: the batch's job is to classify each element, not to guarantee
    /// all elements match. An empty input is a valid batch with zero counts.
    pub fn run(&self, request: BatchExtractRequest) -> BatchExtractResponse {
        let total = request.items.len();
        let results: Vec<ItemOutcome> = request
            .items
            .into_iter()
            .enumerate()
            .map(|(index, input)| self.classify(index, input))
            .collect();

        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        BatchExtractResponse {
            results,
            summary: BatchSummary {
                total,
                succeeded,
                failed: total - succeeded,
            },
        }
    }

    fn classify(&self, index: usize, input: Value) -> ItemOutcome {
        let extracted = input
            .as_str()
            .map(|s| self.extractor.extract(s).map(str::to_string));

        match extracted {
            None => ItemOutcome::not_found(index, input, NOT_A_STRING),
            Some(None) => ItemOutcome::not_found(index, input, NO_IDENTIFIER),
            Some(Some(identifier)) => ItemOutcome::found(index, input, identifier),
        }
    }
}
