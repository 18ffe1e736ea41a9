//! Configuration for the guard.
//!
//! Configuration is loaded from environment variables following the 12-factor app pattern.
//! The validators themselves take no configuration; these settings shape the
//! policy and the access guard built around them.

use crate::access::PayloadStrategy;
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::error::GuardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Guard configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum nesting depth for filters and payloads
    pub max_depth: usize,

    /// How write payloads are handled
    pub payload_strategy: PayloadStrategy,

    /// Refuse payloads whose keys collide after sanitization
    pub strict_keys: bool,

    /// Reserved words on top of the built-in list
    pub extra_reserved_words: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SHOPDB_GUARD_MAX_DEPTH`: Maximum nesting depth (default: 32, minimum: 1)
    /// - `SHOPDB_GUARD_PAYLOAD_STRATEGY`: `reject`, `sanitize` or `both` (default: both)
    /// - `SHOPDB_GUARD_STRICT_KEYS`: Reject sanitized key collisions, `true`/`false`/`1`/`0`
    ///   (default: false)
    /// - `SHOPDB_GUARD_EXTRA_RESERVED`: Comma-separated additional reserved words
    pub fn from_env() -> Result<Self, GuardError> {
        let max_depth = env_parse("SHOPDB_GUARD_MAX_DEPTH")?.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(GuardError::config(
                "SHOPDB_GUARD_MAX_DEPTH must be at least 1",
            ));
        }

        let payload_strategy =
            env_parse("SHOPDB_GUARD_PAYLOAD_STRATEGY")?.unwrap_or_default();

        let strict_keys = env_parse::<Flag>("SHOPDB_GUARD_STRICT_KEYS")?
            .is_some_and(|flag| flag.0);

        let extra_reserved_words = std::env::var("SHOPDB_GUARD_EXTRA_RESERVED")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            max_depth,
            payload_strategy,
            strict_keys,
            extra_reserved_words,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            payload_strategy: PayloadStrategy::default(),
            strict_keys: false,
            extra_reserved_words: Vec::new(),
        }
    }
}

/// Parse an optional environment variable, failing on malformed values.
fn env_parse<T>(name: &str) -> Result<Option<T>, GuardError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| GuardError::config(format!("{} is invalid: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Boolean environment value: `true`, `false`, `1` or `0`, in any case.
struct Flag(bool);

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "true" | "1" => Ok(Flag(true)),
            "false" | "0" => Ok(Flag(false)),
            _ => Err(format!("expected true, false, 1 or 0, got '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SHOPDB_GUARD_MAX_DEPTH",
        "SHOPDB_GUARD_PAYLOAD_STRATEGY",
        "SHOPDB_GUARD_STRICT_KEYS",
        "SHOPDB_GUARD_EXTRA_RESERVED",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.payload_strategy, PayloadStrategy::RejectThenSanitize);
    }

    #[test]
    #[serial]
    fn test_values_from_env() {
        clear_env();
        std::env::set_var("SHOPDB_GUARD_MAX_DEPTH", "8");
        std::env::set_var("SHOPDB_GUARD_PAYLOAD_STRATEGY", "Sanitize");
        std::env::set_var("SHOPDB_GUARD_STRICT_KEYS", "1");
        std::env::set_var("SHOPDB_GUARD_EXTRA_RESERVED", "merge, ,grant");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.max_depth, 8);
        assert_eq!(config.payload_strategy, PayloadStrategy::Sanitize);
        assert!(config.strict_keys);
        assert_eq!(config.extra_reserved_words, vec!["merge", "grant"]);
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        clear_env();
        std::env::set_var("SHOPDB_GUARD_MAX_DEPTH", "deep");
        assert!(matches!(Config::from_env(), Err(GuardError::Config(_))));

        std::env::set_var("SHOPDB_GUARD_MAX_DEPTH", "0");
        assert!(matches!(Config::from_env(), Err(GuardError::Config(_))));

        clear_env();
        std::env::set_var("SHOPDB_GUARD_PAYLOAD_STRATEGY", "ignore");
        assert!(matches!(Config::from_env(), Err(GuardError::Config(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_strict_keys_flag_values() {
        clear_env();
        for (raw, expected) in [("TRUE", true), ("1", true), (" false ", false), ("0", false)] {
            std::env::set_var("SHOPDB_GUARD_STRICT_KEYS", raw);
            assert_eq!(Config::from_env().unwrap().strict_keys, expected, "{:?}", raw);
        }

        for raw in ["yes", "ture", ""] {
            std::env::set_var("SHOPDB_GUARD_STRICT_KEYS", raw);
            assert!(
                matches!(Config::from_env(), Err(GuardError::Config(_))),
                "{:?} accepted",
                raw
            );
        }
        clear_env();
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            strict_keys: true,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
