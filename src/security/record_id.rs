//! Record id validation.
//!
//! Ids arrive either as JSON numbers or as numeric strings (path segments,
//! query strings). Both must denote a safe integer greater than zero.

use crate::constants::MAX_SAFE_INTEGER;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A validated primary-key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    /// Get the numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Accept an unsigned integer if it is in `1..=MAX_SAFE_INTEGER`.
    pub fn from_u64(n: u64) -> Option<Self> {
        (n > 0 && n <= MAX_SAFE_INTEGER).then_some(Self(n))
    }

    /// Accept a float only if it is a whole number in the safe range.
    fn from_f64(n: f64) -> Option<Self> {
        if n.is_finite() && n.fract() == 0.0 && n > 0.0 && n <= MAX_SAFE_INTEGER as f64 {
            Some(Self(n as u64))
        } else {
            None
        }
    }

    /// Parse an id from a JSON value; anything but a number or string is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::from_u64(u)
                } else if n.is_i64() {
                    // Only negative integers land here
                    None
                } else {
                    n.as_f64().and_then(Self::from_f64)
                }
            }
            Value::String(s) => s.parse().ok(),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecordIdError;

impl fmt::Display for InvalidRecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a positive safe integer")
    }
}

impl std::error::Error for InvalidRecordIdError {}

impl FromStr for RecordId {
    type Err = InvalidRecordIdError;

    /// Numeric conversion of a string: surrounding whitespace is ignored and
    /// decimal or exponent notation is accepted (`"5"`, `"5.0"`, `"5e0"`).
    ///
    /// This is deliberately narrower than JavaScript's `Number()`: radix
    /// literals such as `"0x10"`, `"0o7"` and `"0b1"` are rejected rather than
    /// read as 16, 7 and 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidRecordIdError);
        }

        // Integer fast path keeps ids above 2^53 from rounding into range
        if let Ok(n) = trimmed.parse::<u64>() {
            return Self::from_u64(n).ok_or(InvalidRecordIdError);
        }

        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or(InvalidRecordIdError)
    }
}

impl TryFrom<&Value> for RecordId {
    type Error = InvalidRecordIdError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(InvalidRecordIdError)
    }
}

/// Check whether a JSON value is a usable record id.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shopdb_guard::security::is_valid_id;
///
/// assert!(is_valid_id(&json!(5)));
/// assert!(is_valid_id(&json!("5")));
/// assert!(!is_valid_id(&json!(0)));
/// assert!(!is_valid_id(&json!("abc")));
/// ```
pub fn is_valid_id(id: &Value) -> bool {
    RecordId::from_value(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_integers() {
        assert!(is_valid_id(&json!(5)));
        assert!(is_valid_id(&json!(1)));
        assert!(is_valid_id(&json!(MAX_SAFE_INTEGER)));
        assert!(!is_valid_id(&json!(0)));
        assert!(!is_valid_id(&json!(-1)));
        assert!(!is_valid_id(&json!(MAX_SAFE_INTEGER + 1)));
        assert!(!is_valid_id(&json!(u64::MAX)));
    }

    #[test]
    fn test_floats() {
        assert!(is_valid_id(&json!(7.0)));
        assert!(!is_valid_id(&json!(7.5)));
        assert!(!is_valid_id(&json!(-3.0)));
        assert!(!is_valid_id(&json!(1e300)));
    }

    #[test]
    fn test_numeric_strings() {
        assert!(is_valid_id(&json!("5")));
        assert!(is_valid_id(&json!(" 42 ")));
        assert!(is_valid_id(&json!("1e3")));
        assert!(is_valid_id(&json!("9007199254740991")));
        assert!(!is_valid_id(&json!("9007199254740992")));
        assert!(!is_valid_id(&json!("18446744073709551616")));
        assert!(!is_valid_id(&json!("abc")));
        assert!(!is_valid_id(&json!("")));
        assert!(!is_valid_id(&json!("   ")));
        assert!(!is_valid_id(&json!("0")));
        assert!(!is_valid_id(&json!("-1")));
        assert!(!is_valid_id(&json!("2.5")));
        assert!(!is_valid_id(&json!("Infinity")));
        assert!(!is_valid_id(&json!("NaN")));
        assert!(!is_valid_id(&json!("0x10")));
        assert!(!is_valid_id(&json!("0X1F")));
        assert!(!is_valid_id(&json!("0o7")));
        assert!(!is_valid_id(&json!("0b1")));
        assert!(!is_valid_id(&json!("5; DROP TABLE users")));
    }

    #[test]
    fn test_other_types_rejected() {
        assert!(!is_valid_id(&Value::Null));
        assert!(!is_valid_id(&json!(true)));
        assert!(!is_valid_id(&json!([1])));
        assert!(!is_valid_id(&json!({"id": 1})));
    }

    #[test]
    fn test_parsed_value() {
        let id = RecordId::try_from(&json!("17")).unwrap();
        assert_eq!(id.get(), 17);
        assert_eq!(id.to_string(), "17");
        assert_eq!("17".parse::<RecordId>(), Ok(id));
        assert_eq!(RecordId::from_u64(0), None);
    }
}
