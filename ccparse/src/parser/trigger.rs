// SPDX-License-Identifier: GPL-3.0-or-later

//! Decides whether an engine should attempt to parse a line.
//!
//! A trigger holds two ordered pattern lists which are tested against the
//! raw, unsplit line. The line is accepted when every "match" pattern is
//! found and none of the "don't match" patterns is. The evaluation
//! short-circuits, so cheap and frequent patterns should come first.

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// A pattern searched for in the raw line.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Plain substring search.
    Literal(String),
    /// Unanchored regular expression search.
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Compiles the expression, failing immediately on syntax errors.
    pub fn regex(expression: &str) -> Result<Self, TriggerError> {
        Regex::new(expression)
            .map(Pattern::Regex)
            .map_err(|source| TriggerError::InvalidPattern { pattern: expression.to_string(), source })
    }

    pub fn is_found(&self, line: &str) -> bool {
        match self {
            Pattern::Literal(text) => line.contains(text.as_str()),
            Pattern::Regex(regex) => regex.is_match(line),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "literal {text:?}"),
            Pattern::Regex(regex) => write!(f, "regex {:?}", regex.as_str()),
        }
    }
}

/// The must match / must not match pattern pair of an engine.
#[derive(Clone, Debug, Default)]
pub struct Trigger {
    matches: Vec<Pattern>,
    dont_matches: Vec<Pattern>,
}

impl Trigger {
    pub fn new(matches: Vec<Pattern>, dont_matches: Vec<Pattern>) -> Self {
        Self { matches, dont_matches }
    }

    /// Builds a trigger from regular expression sources.
    pub fn from_regexes(matches: &[&str], dont_matches: &[&str]) -> Result<Self, TriggerError> {
        let matches = matches.iter().map(|expression| Pattern::regex(expression)).collect::<Result<_, _>>()?;
        let dont_matches =
            dont_matches.iter().map(|expression| Pattern::regex(expression)).collect::<Result<_, _>>()?;
        Ok(Self { matches, dont_matches })
    }

    /// Tests the raw line against the patterns.
    pub fn is_triggered(&self, line: &str) -> bool {
        if let Some(pattern) = self.matches.iter().find(|pattern| !pattern.is_found(line)) {
            log::trace!("Trigger rejected line, missing {pattern}");
            return false;
        }
        if let Some(pattern) = self.dont_matches.iter().find(|pattern| pattern.is_found(line)) {
            log::trace!("Trigger rejected line, found {pattern}");
            return false;
        }
        true
    }
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Invalid trigger pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
