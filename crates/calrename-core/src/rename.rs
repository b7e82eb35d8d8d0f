//! Title rename rules.
//!
//! A [`RenameRule`] is a case-insensitive regular expression paired with a
//! replacement template. Applying it to a title substitutes every
//! non-overlapping match and reports whether the title actually changed.
//!
//! Replacement templates use the `regex` crate syntax: `$1` or `${1}` for a
//! numbered group, `${name}` for a named group and `$$` for a literal `$`.

use std::fmt;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Error returned when a rename pattern does not compile.
#[derive(Debug, Error)]
#[error("invalid rename pattern '{pattern}': {source}")]
pub struct RuleError {
    pattern: String,
    #[source]
    source: regex::Error,
}

impl RuleError {
    /// Returns the pattern that failed to compile.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// The outcome of applying a [`RenameRule`] to a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// The title after substitution.
    pub title: String,
    /// Whether `title` differs from the input.
    pub changed: bool,
}

/// A compiled, case-insensitive title substitution.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: Regex,
    replacement: String,
}

impl RenameRule {
    /// Compiles a new rule.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, RuleError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    /// Returns the source pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the replacement template.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Applies the rule to `title`.
    ///
    /// `changed` compares the result byte-for-byte with the input, so a
    /// match whose replacement reproduces the original text is not a change.
    pub fn apply(&self, title: &str) -> Renamed {
        let new_title = self
            .pattern
            .replace_all(title, self.replacement.as_str())
            .into_owned();
        let changed = new_title != title;

        Renamed {
            title: new_title,
            changed,
        }
    }
}

impl fmt::Display for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s/{}/{}/gi", self.pattern.as_str(), self.replacement)
    }
}
