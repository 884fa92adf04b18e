//! Block Extractor: latest block number from a log tail window.

use thiserror::Error;

use super::rules::RuleTable;
use crate::types::{BlockNumber, LogTailWindow};

/// A rule's capture that is not a base-10 unsigned integer.
///
/// Recovered inside the extractor by falling back to the next rule.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("captured text {raw:?} is not a block number")]
pub(crate) struct ParseError {
    raw: String,
}

/// Which rule produced a block number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    pub rule: &'t str,
    pub block: u64,
}

/// Applies a [`RuleTable`] to a tail window.
///
/// Rules are tried highest priority first; the first rule whose newest
/// match parses as a block number wins. Pure: no I/O, never fails.
#[derive(Clone, Debug, Default)]
pub struct BlockExtractor {
    rules: RuleTable,
}

impl BlockExtractor {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// Latest block number in `window`, or [`BlockNumber::NotFound`].
    pub fn extract(&self, window: &LogTailWindow) -> BlockNumber {
        self.extract_with_rule(window).map(|m| m.block).into()
    }

    /// Like [`extract`](Self::extract), also naming the winning rule.
    pub fn extract_with_rule(&self, window: &LogTailWindow) -> Option<RuleMatch<'_>> {
        for rule in self.rules.rules() {
            let Some(raw) = rule.last_capture(window) else {
                continue;
            };

            match parse_block(raw) {
                Ok(block) => {
                    tracing::debug!(rule = rule.name(), block, "block number extracted");
                    return Some(RuleMatch {
                        rule: rule.name(),
                        block,
                    });
                }
                Err(e) => {
                    tracing::debug!(rule = rule.name(), "falling back to next rule: {e}");
                }
            }
        }

        tracing::debug!(lines = window.len(), "no extraction rule matched");
        None
    }
}

/// Normalises a raw capture and parses it as a block number.
///
/// Surrounding quotes and trailing punctuation are dropped; what remains
/// must be plain ASCII digits that fit in a `u64`.
pub(crate) fn parse_block(raw: &str) -> Result<u64, ParseError> {
    let quotes: &[char] = &['"', '\''];
    let trailing: &[char] = &['.', ',', ';', ':', ')', ']', '}'];

    let trimmed = raw
        .trim()
        .trim_matches(quotes)
        .trim_end_matches(trailing)
        .trim_matches(quotes);

    let err = || ParseError {
        raw: raw.to_string(),
    };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    trimmed.parse::<u64>().map_err(|_| err())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(lines: &[&str]) -> LogTailWindow {
        lines.iter().copied().collect()
    }

    fn extract(lines: &[&str]) -> BlockNumber {
        BlockExtractor::default().extract(&window(lines))
    }

    #[test]
    fn newest_done_processing_line_wins() {
        let result = extract(&["Done processing block 10", "Done processing block 12"]);
        assert_eq!(result, BlockNumber::Found(12));
    }

    #[test]
    fn chain_segment_is_used_without_done_processing_lines() {
        let result = extract(&[r#"Inserted new chain segment ... number: "7""#]);
        assert_eq!(result, BlockNumber::Found(7));
    }

    #[test]
    fn empty_window_is_not_found() {
        assert_eq!(extract(&[]), BlockNumber::NotFound);
    }

    #[test]
    fn malformed_only_match_is_not_found() {
        assert_eq!(extract(&["Done processing block abc"]), BlockNumber::NotFound);
    }

    #[test]
    fn unrelated_lines_are_not_found() {
        let result = extract(&[
            "INFO starting p2p listener",
            "WARN peer disconnected",
            "blockchain/state.go:12 committed state root",
        ]);
        assert_eq!(result, BlockNumber::NotFound);
    }

    #[test]
    fn highest_priority_rule_wins_over_newer_lower_rules() {
        let result = extract(&[
            "Done processing block 90",
            r#"Inserted new chain segment {"number": "95"}"#,
            r#"Inserted new block {"number": "96"}"#,
            "blockchain/blocks_processor.go:120 committing block 97",
            "downloader: peer returned block hash 0xabc for block 98",
        ]);
        assert_eq!(result, BlockNumber::Found(90));
    }

    #[test]
    fn malformed_high_priority_match_falls_back() {
        let result = extract(&[
            r#"Inserted new block {"hash": "0x01", "number": "55"}"#,
            "Done processing block abc",
        ]);
        assert_eq!(result, BlockNumber::Found(55));
    }

    #[test]
    fn malformed_newest_match_disqualifies_the_whole_rule() {
        let result = extract(&[
            "Done processing block 40",
            "downloader: peer returned block hash 0xabc for block 41",
            "Done processing block ???",
        ]);
        assert_eq!(result, BlockNumber::Found(41));
    }

    #[test]
    fn fallback_chain_reaches_each_rule() {
        assert_eq!(
            extract(&[r#"Inserted new block {"number": "3"}"#]),
            BlockNumber::Found(3)
        );
        assert_eq!(
            extract(&["blockchain/blocks_processor.go:77 processing block 4"]),
            BlockNumber::Found(4)
        );
        assert_eq!(
            extract(&["returned block hash 0xdead for block 5"]),
            BlockNumber::Found(5)
        );
    }

    #[test]
    fn inserted_block_beats_processor_and_downloader() {
        let result = extract(&[
            r#"Inserted new block number="17" txs=3"#,
            "blockchain/blocks_processor.go:77 processing block 18",
            "returned block hash 0xdead for block 19",
        ]);
        assert_eq!(result, BlockNumber::Found(17));
    }

    #[test]
    fn processor_line_with_trailing_block_words_keeps_its_number() {
        assert_eq!(
            extract(&["blockchain/blocks_processor.go:88 committed block 97, block size 1234"]),
            BlockNumber::Found(97)
        );
        assert_eq!(
            extract(&[
                "blockchain/blocks_processor.go:88 committed block 97 to block store",
                "returned block hash 0x1 for block 50",
            ]),
            BlockNumber::Found(97)
        );
    }

    #[test]
    fn comma_grouped_number_falls_back_instead_of_truncating() {
        assert_eq!(
            extract(&[
                "Inserted new block number=19,876,543 hash=0xabc",
                "returned block hash 0x1 for block 19876540",
            ]),
            BlockNumber::Found(19_876_540)
        );
        assert_eq!(
            extract(&["Inserted new chain segment number=1,234,567"]),
            BlockNumber::NotFound
        );
    }

    #[test]
    fn unquoted_number_followed_by_comma_is_accepted() {
        assert_eq!(
            extract(&[r#"Inserted new block {"number": 64, "txs": 2}"#]),
            BlockNumber::Found(64)
        );
    }

    #[test]
    fn newest_match_of_a_rule_wins_not_first_or_middle() {
        let result = extract(&[
            "returned block hash 0x1 for block 100",
            "returned block hash 0x2 for block 300",
            "returned block hash 0x3 for block 200",
        ]);
        assert_eq!(result, BlockNumber::Found(200));
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = BlockExtractor::default();
        let w = window(&[
            "Done processing block 8",
            "returned block hash 0x3 for block 9",
        ]);

        assert_eq!(extractor.extract(&w), extractor.extract(&w));
    }

    #[test]
    fn zero_is_a_valid_block_number() {
        assert_eq!(extract(&["Done processing block 0"]), BlockNumber::Found(0));
    }

    #[test]
    fn winning_rule_is_reported() {
        let extractor = BlockExtractor::default();
        let w = window(&[r#"Inserted new chain segment "number": "21""#]);

        let m = extractor.extract_with_rule(&w).expect("rule should match");
        assert_eq!(m.rule, "inserted-chain-segment");
        assert_eq!(m.block, 21);
    }

    #[test]
    fn parse_block_normalises_punctuation_and_quotes() {
        assert_eq!(parse_block("12"), Ok(12));
        assert_eq!(parse_block("12,"), Ok(12));
        assert_eq!(parse_block("\"12\""), Ok(12));
        assert_eq!(parse_block("12."), Ok(12));
        assert!(parse_block("+12").is_err());
        assert!(parse_block("-1").is_err());
        assert!(parse_block("0x1f").is_err());
        assert!(parse_block("").is_err());
        assert!(parse_block("99999999999999999999999").is_err());
    }
}
