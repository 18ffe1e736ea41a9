//! Injection pattern detection for string values.
//!
//! Deliberately broad: tokens are matched as case-insensitive substrings, not
//! words, so `selection` trips on `select`. Both structural validators share
//! this detector.

use crate::constants::INJECTION_TOKENS;

/// Detector for injection-looking fragments in string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionDetector {
    /// Stored lower-cased
    tokens: Vec<String>,
}

impl InjectionDetector {
    /// Create a detector from a custom token list.
    pub fn with_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Check whether a value contains any suspicious token.
    pub fn is_suspicious(&self, value: &str) -> bool {
        let lower = value.to_lowercase();
        self.tokens.iter().any(|token| lower.contains(token.as_str()))
    }

    /// The tokens this detector looks for.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl Default for InjectionDetector {
    fn default() -> Self {
        Self::with_tokens(INJECTION_TOKENS)
    }
}
