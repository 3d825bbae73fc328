//! Drive identifier extraction.
//!
//! A Drive sharing URL embeds its resource identifier after one of three
//! literal markers:
//!
//! - `/d/` for documents, spreadsheets, and file links
//! - `folders/` for folder links
//! - `id=` for legacy `open?id=` and `uc?export=download&id=` links
//!
//! The identifier itself is an opaque run of `[A-Za-z0-9_-]` characters.
//! Extraction scans for the leftmost marker followed by a sufficiently long
//! run and returns that run verbatim.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Default minimum length for a captured identifier.
///
/// Requiring a minimum run rejects marker-like fragments in unrelated URLs
/// (`/d/e`, `id=42`). Folder identifiers from older share links can be as
/// short as ten characters, so the default stays at the permissive end.
pub const DEFAULT_MIN_IDENTIFIER_LEN: usize = 10;

/// Extracts Drive identifiers from URL strings.
///
/// The pattern is compiled once at construction; matching is read-only, so a
/// single extractor can serve any number of concurrent requests.
#[derive(Debug)]
pub struct IdExtractor {
    pattern: Regex,
    min_len: usize,
}

impl IdExtractor {
    /// Creates an extractor that requires captured runs of at least
    /// `min_len` characters.
    ///
    /// Alternatives are tried in order (`/d/`, `folders/`, `id=`) at each
    /// position, but positions are scanned left to right, so the leftmost
    /// qualifying marker wins regardless of which alternative it is.
    pub fn new(min_len: usize) -> Self {
        let pattern = format!(r"(?:/d/|folders/|id=)([A-Za-z0-9_-]{{{min_len},}})");
        Self {
            pattern: Regex::new(&pattern).expect("marker pattern is valid"),
            min_len,
        }
    }

    /// The minimum captured-run length this extractor enforces.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Returns the identifier embedded in `input`, or `None` if no marker is
    /// followed by a qualifying run anywhere in the string.
    ///
    /// The capture is greedy: it consumes the longest run of allowed
    /// characters starting right after the marker, and is returned verbatim
    /// with no trimming or case folding.
    pub fn extract<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Extraction over an arbitrary JSON value.
    ///
    /// Batch inputs may contain non-string elements; those yield `None`
    /// rather than an error so one malformed element cannot abort a batch.
    pub fn extract_value(&self, value: &Value) -> Option<String> {
        value
            .as_str()
            .and_then(|s| self.extract(s))
            .map(str::to_string)
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_IDENTIFIER_LEN)
    }
}

static DEFAULT_EXTRACTOR: OnceLock<IdExtractor> = OnceLock::new();

/// Returns the process-wide extractor with the default length policy.
pub fn default_extractor() -> &'static IdExtractor {
    DEFAULT_EXTRACTOR.get_or_init(IdExtractor::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_document_identifier() {
        let extractor = IdExtractor::default();
        let url = "https://docs.google.com/document/d/1aBcD_eX-yZ1234567890AbCdEf/edit";
        assert_eq!(extractor.extract(url), Some("1aBcD_eX-yZ1234567890AbCdEf"));
    }

    #[test]
    fn test_extracts_folder_identifier() {
        let extractor = IdExtractor::default();
        let url = "https://drive.google.com/drive/folders/0B1234567890abcdefghij?usp=sharing";
        assert_eq!(extractor.extract(url), Some("0B1234567890abcdefghij"));
    }

    #[test]
    fn test_extracts_query_parameter_identifier() {
        let extractor = IdExtractor::default();
        let url = "https://drive.google.com/open?id=ABCDEFGHIJ1234567890XYZ";
        assert_eq!(extractor.extract(url), Some("ABCDEFGHIJ1234567890XYZ"));
    }

    /// The 10-vs-25 policy scenario: a ten-character folder identifier is
    /// rejected under a 25-character minimum but accepted under the default.
    #[test]
    fn test_minimum_length_policy() {
        let url = "https://drive.google.com/drive/folders/2bCdE12345";

        let permissive = IdExtractor::new(10);
        assert_eq!(permissive.extract(url), Some("2bCdE12345"));

        let strict = IdExtractor::new(25);
        assert_eq!(strict.extract(url), None);
    }

    #[test]
    fn test_run_exactly_at_minimum_matches() {
        let extractor = IdExtractor::new(10);
        assert_eq!(extractor.extract("/d/ABCDEFGHIJ"), Some("ABCDEFGHIJ"));
        assert_eq!(extractor.extract("/d/ABCDEFGHI"), None);
    }

    #[test]
    fn test_capture_is_greedy_and_stops_at_disallowed_characters() {
        let extractor = IdExtractor::default();
        let url = "https://docs.google.com/document/d/1aB-cD_eF2gH4iJ6/edit?usp=sharing";
        assert_eq!(extractor.extract(url), Some("1aB-cD_eF2gH4iJ6"));
    }

    #[test]
    fn test_leftmost_marker_wins() {
        let extractor = IdExtractor::default();
        let url = "https://x.test/d/AAAAAAAAAAAA/folders/BBBBBBBBBBBB";
        assert_eq!(extractor.extract(url), Some("AAAAAAAAAAAA"));
    }

    /// A marker whose run is too short does not block a later qualifying
    /// marker: the leftmost match of the full pattern is used.
    #[test]
    fn test_short_run_falls_through_to_later_marker() {
        let extractor = IdExtractor::default();
        let url = "https://x.test/open?id=abc&next=/d/ABCDEFGHIJKLMNOP";
        assert_eq!(extractor.extract(url), Some("ABCDEFGHIJKLMNOP"));
    }

    #[test]
    fn test_identifier_returned_verbatim() {
        let extractor = IdExtractor::default();
        // Mixed case and separators survive untouched.
        assert_eq!(
            extractor.extract("id=aBcDeF_-123456"),
            Some("aBcDeF_-123456")
        );
    }

    #[test]
    fn test_no_marker_yields_none() {
        let extractor = IdExtractor::default();
        assert_eq!(extractor.extract("https://example.com/page"), None);
        assert_eq!(extractor.extract(""), None);
        assert_eq!(extractor.extract("not a url"), None);
    }

    #[test]
    fn test_marker_at_end_of_string_yields_none() {
        let extractor = IdExtractor::default();
        assert_eq!(extractor.extract("https://drive.google.com/drive/folders/"), None);
    }

    #[test]
    fn test_non_string_values_yield_none() {
        let extractor = IdExtractor::default();
        assert_eq!(extractor.extract_value(&json!(42)), None);
        assert_eq!(extractor.extract_value(&json!(null)), None);
        assert_eq!(extractor.extract_value(&json!(true)), None);
        assert_eq!(extractor.extract_value(&json!(["/d/ABCDEFGHIJ"])), None);
        assert_eq!(extractor.extract_value(&json!({"url": "/d/ABCDEFGHIJ"})), None);
    }

    #[test]
    fn test_string_value_extracts() {
        let extractor = IdExtractor::default();
        assert_eq!(
            extractor.extract_value(&json!("https://drive.google.com/open?id=ABCDEFGHIJKL")),
            Some("ABCDEFGHIJKL".to_string())
        );
    }

    #[test]
    fn test_default_extractor_uses_default_policy() {
        assert_eq!(default_extractor().min_len(), DEFAULT_MIN_IDENTIFIER_LEN);
    }
}
