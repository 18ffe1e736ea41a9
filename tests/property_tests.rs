//! Property-based tests using proptest
//!
//! These generate many random inputs to check invariants of the validators
//! and the sanitizer that should hold for all inputs.

use proptest::prelude::*;
use serde_json::{Map, Value};
use shopdb_guard::constants::RESERVED_WORDS;
use shopdb_guard::security::{
    is_valid_id, is_valid_identifier, is_valid_query_params, sanitize_for_storage,
    sanitize_key, sanitize_string,
};

/// Strategy for strings mixing plain text with dangerous fragments
fn hostile_string_strategy() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-zA-Z0-9 ]{0,8}",
        Just("'".to_string()),
        Just(";".to_string()),
        Just("-".to_string()),
        Just("/".to_string()),
        Just("*".to_string()),
        Just(" SELECT ".to_string()),
        Just("drop".to_string()),
        Just("Union All".to_string()),
        Just("use".to_string()),
    ];
    prop::collection::vec(piece, 0..12).prop_map(|parts| parts.concat())
}

/// Strategy for nested JSON values with hostile strings and keys
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        hostile_string_strategy().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z0-9 ;_-]{0,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Whether two values have the same container structure
fn same_shape(input: &Value, output: &Value) -> bool {
    match (input, output) {
        (Value::Null, Value::Null)
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_)) => true,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_shape(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut keys: Vec<String> = a.keys().map(|k| sanitize_key(k)).collect();
            keys.sort();
            keys.dedup();
            keys.len() == b.len() && keys.iter().all(|k| b.contains_key(k))
        }
        _ => false,
    }
}

proptest! {
    #[test]
    fn grammar_matching_names_are_valid(name in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
        let reserved = RESERVED_WORDS.contains(&name.to_uppercase().as_str());
        prop_assert_eq!(is_valid_identifier(&name), !reserved);
    }

    #[test]
    fn names_starting_with_digit_are_invalid(name in "[0-9][A-Za-z0-9_]{0,20}") {
        prop_assert!(!is_valid_identifier(&name));
    }

    #[test]
    fn positive_integers_in_range_are_valid_ids(n in 1u64..=9_007_199_254_740_991) {
        prop_assert!(is_valid_id(&Value::from(n)));
        prop_assert!(is_valid_id(&Value::String(n.to_string())));
    }

    #[test]
    fn non_positive_integers_are_invalid_ids(n in i64::MIN..=0) {
        prop_assert!(!is_valid_id(&Value::from(n)));
        prop_assert!(!is_valid_id(&Value::String(n.to_string())));
    }

    #[test]
    fn sanitize_string_is_idempotent(s in hostile_string_strategy()) {
        let once = sanitize_string(&s);
        prop_assert_eq!(sanitize_string(&once), once);
    }

    #[test]
    fn sanitized_strings_have_no_dangerous_fragments(s in hostile_string_strategy()) {
        let out = sanitize_string(&s);
        prop_assert!(!out.contains(';'));
        prop_assert!(!out.contains("--"));
        prop_assert!(!out.contains("/*"));
        prop_assert!(!out.contains("*/"));
        prop_assert!(out.split("''").all(|part| !part.contains('\'')));
    }

    #[test]
    fn sanitize_value_is_idempotent(v in value_strategy()) {
        let once = sanitize_for_storage(&v);
        prop_assert_eq!(sanitize_for_storage(&once), once);
    }

    #[test]
    fn sanitize_preserves_shape(v in value_strategy()) {
        let out = sanitize_for_storage(&v);
        prop_assert!(same_shape(&v, &out));
    }

    #[test]
    fn sanitized_keys_are_identifier_shaped(key in ".{0,12}") {
        let clean = sanitize_key(&key);
        prop_assert!(clean.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        prop_assert!(!clean.starts_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn non_object_params_are_invalid(v in value_strategy()) {
        if !v.is_object() {
            prop_assert!(!is_valid_query_params(&v));
        }
    }
}
