//! Log-derived block number extraction.
//!
//! The node's log format has changed over time, so several classes of line
//! may carry a block number, and old and new formats can sit side by side in
//! one tail window. This module turns such a window into one authoritative
//! value:
//!
//! - [`rules::RuleTable`] holds the priority-ordered extraction rules,
//!   loaded from TOML so a format change is a table change,
//! - [`extractor::BlockExtractor`] walks the table top-down and returns
//!   the first rule's newest parseable match.

pub mod extractor;
pub mod rules;

pub use extractor::{BlockExtractor, RuleMatch};
pub use rules::{DEFAULT_RULES_TOML, ExtractionRule, RuleTable};
