//! Structural validation of filter maps and write payloads.
//!
//! Every key at every level must be identifier-shaped (and whitelisted, when a
//! whitelist is given). Every string value goes through the injection
//! detector. Nested objects are walked; arrays and non-string scalars are not
//! inspected.

use super::identifiers::is_identifier_shaped;
use super::injection::InjectionDetector;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Permitted field names for a write operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldWhitelist {
    fields: HashSet<String>,
}

impl FieldWhitelist {
    /// Create a whitelist from field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a field is permitted. Matching is case-sensitive.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Number of permitted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is permitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldWhitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Walker applying the structural rules up to a fixed depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StructureValidator<'a> {
    pub(crate) detector: &'a InjectionDetector,
    pub(crate) allowed: Option<&'a FieldWhitelist>,
    pub(crate) max_depth: usize,
}

impl StructureValidator<'_> {
    /// Validate a top-level value. Anything but an object is rejected.
    pub(crate) fn validate(&self, data: &Value) -> bool {
        match data {
            Value::Object(map) => self.validate_map(map, 1),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                false
            }
        }
    }

    fn validate_map(&self, map: &Map<String, Value>, depth: usize) -> bool {
        // Fail closed instead of recursing without bound
        if depth > self.max_depth {
            return false;
        }

        map.iter()
            .all(|(key, value)| self.validate_entry(key, value, depth))
    }

    fn validate_entry(&self, key: &str, value: &Value, depth: usize) -> bool {
        if let Some(allowed) = self.allowed {
            if !allowed.contains(key) {
                return false;
            }
        }

        if !is_identifier_shaped(key) {
            return false;
        }

        match value {
            Value::Null => true,
            Value::String(s) => !self.detector.is_suspicious(s),
            Value::Object(nested) => self.validate_map(nested, depth + 1),
            Value::Array(_) | Value::Bool(_) | Value::Number(_) => true,
        }
    }
}
