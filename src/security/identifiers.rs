//! Table and column name validation.
//!
//! A name is usable only if it matches `^[A-Za-z_][A-Za-z0-9_]*$` and is not a
//! reserved word. The reserved-word check is an exact, case-insensitive match:
//! `selected` is fine even though it starts with `select`.

use crate::constants::RESERVED_WORDS;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Identifier grammar, anchored at both ends.
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .unwrap_or_else(|e| panic!("Internal error: invalid identifier pattern: {}", e))
});

/// Case-insensitive set of names that may not be used as identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    /// Stored upper-cased
    words: HashSet<String>,
}

impl ReservedWords {
    /// Build a reserved-word set from arbitrary casing.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Return a copy of this set with additional words.
    pub fn with_additional<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    /// Check whether `name` is reserved, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.words.contains(&name.to_uppercase())
    }

    /// Number of reserved words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new(RESERVED_WORDS)
    }
}

/// Check the identifier grammar only, without the reserved-word check.
///
/// Parameter and payload keys are held to this shape.
///
/// # Examples
///
/// ```
/// use shopdb_guard::security::is_identifier_shaped;
///
/// assert!(is_identifier_shaped("order_total"));
/// assert!(is_identifier_shaped("select"));
/// assert!(!is_identifier_shaped("2fast"));
/// assert!(!is_identifier_shaped("name; --"));
/// ```
pub fn is_identifier_shaped(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

/// Validate a table or column name against the grammar and a reserved-word set.
pub fn validate_identifier(name: &str, reserved: &ReservedWords) -> bool {
    is_identifier_shaped(name) && !reserved.contains(name)
}
