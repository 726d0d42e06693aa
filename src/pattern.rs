//! Filename pattern matching.
//!
//! A pattern is a regular expression whose first capturing group names the
//! subfolder a file belongs in. The search is unanchored, so `artist_([a-z]+)`
//! finds its group anywhere in the name.

use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Folder name used when group 1 captures nothing but whitespace.
pub const FALLBACK_GROUP: &str = "Unknown";

/// The pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// The regex engine's syntax message.
        reason: String,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// What a pattern made of one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Group 1 matched. `group` is trimmed (or the fallback label), `span` is the
    /// byte range of the raw capture inside the filename.
    Matched { group: String, span: Range<usize> },
    /// The pattern matched but group 1 did not take part (or does not exist).
    NoGroup,
    /// The pattern did not match at all.
    NoMatch,
}

impl MatchOutcome {
    /// The folder name to classify into, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            MatchOutcome::Matched { group, .. } => Some(group),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

/// A compiled filename pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles `pattern`, case-insensitively when asked.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::InvalidPattern` carrying the syntax message.
    ///
    /// # Examples
    ///
    /// ```
    /// use namesort::pattern::CompiledPattern;
    ///
    /// let pattern = CompiledPattern::compile(r"artist[_\s-]*([a-z]+)", true).unwrap();
    /// assert_eq!(pattern.classify("ARTIST_Alice - pic1.jpg").group(), Some("Alice"));
    /// assert!(CompiledPattern::compile("(unclosed", true).is_err());
    /// ```
    pub fn compile(pattern: &str, case_insensitive: bool) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| PatternError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Searches `file_name` for the first occurrence of the pattern.
    pub fn classify(&self, file_name: &str) -> MatchOutcome {
        let Some(captures) = self.regex.captures(file_name) else {
            return MatchOutcome::NoMatch;
        };
        let Some(group) = captures.get(1) else {
            return MatchOutcome::NoGroup;
        };

        let trimmed = group.as_str().trim();
        let group_value = if trimmed.is_empty() {
            FALLBACK_GROUP.to_string()
        } else {
            trimmed.to_string()
        };

        MatchOutcome::Matched {
            group: group_value,
            span: group.range(),
        }
    }
}
