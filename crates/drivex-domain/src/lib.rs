//! drivex-domain: the Drive identifier extraction rule
//!
//! This crate contains the pure extraction logic:
//! - Marker pattern compilation with a minimum-length policy
//! - Extraction over strings and over arbitrary JSON values
//!
//! No I/O, no shared mutable state. The compiled pattern is process-wide
//! immutable configuration and is safe to share across threads.

pub mod extract;

pub use extract::{default_extractor, IdExtractor, DEFAULT_MIN_IDENTIFIER_LEN};
