//! Immutable validation policy.
//!
//! Bundles the reserved words, the injection detector and the depth limit so
//! callers (and tests) can run the validators against alternate rule sets
//! without touching shared state.

use super::identifiers::{validate_identifier, ReservedWords};
use super::injection::InjectionDetector;
use super::record_id::is_valid_id;
use super::sanitize::Sanitizer;
use super::structure::{FieldWhitelist, StructureValidator};
use crate::config::Config;
use crate::constants::DEFAULT_MAX_DEPTH;
use serde_json::Value;

/// Rule set for all validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    reserved: ReservedWords,
    detector: InjectionDetector,
    max_depth: usize,
}

impl ValidationPolicy {
    /// Create a policy from its parts.
    pub fn new(reserved: ReservedWords, detector: InjectionDetector, max_depth: usize) -> Self {
        Self {
            reserved,
            detector,
            max_depth,
        }
    }

    /// Build the policy described by a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            reserved: ReservedWords::default().with_additional(&config.extra_reserved_words),
            detector: InjectionDetector::default(),
            max_depth: config.max_depth,
        }
    }

    /// Replace the reserved-word set.
    pub fn with_reserved_words(mut self, reserved: ReservedWords) -> Self {
        self.reserved = reserved;
        self
    }

    /// Replace the injection detector.
    pub fn with_detector(mut self, detector: InjectionDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replace the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum nesting depth accepted by the structural checks.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check a table or column name.
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        validate_identifier(name, &self.reserved)
    }

    /// Check a table or column name given as an arbitrary JSON value.
    /// Non-strings are invalid.
    pub fn is_valid_identifier_value(&self, name: &Value) -> bool {
        name.as_str()
            .is_some_and(|s| self.is_valid_identifier(s))
    }

    /// Check a record id.
    pub fn is_valid_id(&self, id: &Value) -> bool {
        is_valid_id(id)
    }

    /// Check a filter map.
    pub fn is_valid_query_params(&self, params: &Value) -> bool {
        self.structure(None).validate(params)
    }

    /// Check a write payload, optionally restricted to a set of field names.
    pub fn is_valid_for_storage(&self, data: &Value, allowed: Option<&FieldWhitelist>) -> bool {
        self.structure(allowed).validate(data)
    }

    /// Check whether a single string value looks like an injection attempt.
    pub fn is_suspicious(&self, value: &str) -> bool {
        self.detector.is_suspicious(value)
    }

    /// Sanitizer bound to this policy's depth limit.
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.max_depth)
    }

    /// Rewrite a payload for storage. Never fails.
    pub fn sanitize_for_storage(&self, data: &Value) -> Value {
        self.sanitizer().sanitize(data)
    }

    fn structure<'a>(&'a self, allowed: Option<&'a FieldWhitelist>) -> StructureValidator<'a> {
        StructureValidator {
            detector: &self.detector,
            allowed,
            max_depth: self.max_depth,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(
            ReservedWords::default(),
            InjectionDetector::default(),
            DEFAULT_MAX_DEPTH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_value() {
        let p = ValidationPolicy::default();
        assert!(p.is_valid_identifier_value(&json!("orders")));
        assert!(!p.is_valid_identifier_value(&json!(12)));
        assert!(!p.is_valid_identifier_value(&Value::Null));
    }

    #[test]
    fn test_alternate_policies_do_not_leak() {
        let strict = ValidationPolicy::default()
            .with_reserved_words(ReservedWords::default().with_additional(["reviews"]));
        let default = ValidationPolicy::default();

        assert!(!strict.is_valid_identifier("reviews"));
        assert!(default.is_valid_identifier("reviews"));
    }

    #[test]
    fn test_custom_detector() {
        let p = ValidationPolicy::default().with_detector(InjectionDetector::with_tokens(["<script"]));
        assert!(p.is_valid_query_params(&json!({"name": "O'Brien"})));
        assert!(!p.is_valid_query_params(&json!({"bio": "<SCRIPT>"})));
    }

    #[test]
    fn test_depth_setting_reaches_sanitizer() {
        let p = ValidationPolicy::default().with_max_depth(1);
        assert_eq!(p.sanitizer().max_depth(), 1);
        assert_eq!(p.sanitize_for_storage(&json!({"a": {"b": 1}})), json!({"a": null}));
        assert!(!p.is_valid_query_params(&json!({"a": {"b": 1}})));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            max_depth: 3,
            extra_reserved_words: vec!["merge".to_string()],
            ..Config::default()
        };
        let p = ValidationPolicy::from_config(&config);
        assert_eq!(p.max_depth(), 3);
        assert!(!p.is_valid_identifier("MERGE"));
        assert!(!p.is_valid_identifier("select"));
    }
}
