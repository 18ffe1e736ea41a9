//! Input validation and sanitization for database access.
//!
//! The free functions here run against the built-in [`ValidationPolicy`]; use
//! the policy type directly to substitute other word lists or depth limits.

mod identifiers;
mod injection;
mod policy;
mod record_id;
mod sanitize;
mod structure;

use once_cell::sync::Lazy;
use serde_json::Value;

pub use identifiers::{is_identifier_shaped, validate_identifier, ReservedWords};
pub use injection::InjectionDetector;
pub use policy::ValidationPolicy;
pub use record_id::{is_valid_id, InvalidRecordIdError, RecordId};
pub use sanitize::{sanitize_key, sanitize_string, Sanitizer};
pub use structure::FieldWhitelist;

static DEFAULT_POLICY: Lazy<ValidationPolicy> = Lazy::new(ValidationPolicy::default);

/// Check a table or column name against the built-in reserved words.
///
/// # Examples
///
/// ```
/// use shopdb_guard::security::is_valid_identifier;
///
/// assert!(is_valid_identifier("users"));
/// assert!(is_valid_identifier("selected_items"));
/// assert!(!is_valid_identifier("123abc"));
/// assert!(!is_valid_identifier("Drop"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    DEFAULT_POLICY.is_valid_identifier(name)
}

/// Check a filter map intended for query construction.
pub fn is_valid_query_params(params: &Value) -> bool {
    DEFAULT_POLICY.is_valid_query_params(params)
}

/// Check a write payload, optionally against a field whitelist.
pub fn is_valid_for_storage(data: &Value, allowed: Option<&FieldWhitelist>) -> bool {
    DEFAULT_POLICY.is_valid_for_storage(data, allowed)
}

/// Rewrite a payload so it is safe to persist. Never fails.
pub fn sanitize_for_storage(data: &Value) -> Value {
    DEFAULT_POLICY.sanitize_for_storage(data)
}
