//! Guard for the data-access layer.
//!
//! Wraps the boolean validators into `Result`s a repository can `?` on before
//! it builds a storage operation: names, ids, filter criteria and payloads.
//! Rejections are logged without saying which rule fired.

use crate::config::Config;
use crate::constants::LOG_TRUNCATE_LENGTH;
use crate::error::GuardError;
use crate::security::{FieldWhitelist, RecordId, ValidationPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How write payloads are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStrategy {
    /// Validate only; accepted payloads are stored as given.
    Reject,
    /// Sanitize only; nothing is refused, and fields outside the whitelist
    /// are dropped instead.
    Sanitize,
    /// Validate, then sanitize what was accepted.
    #[default]
    RejectThenSanitize,
}

impl PayloadStrategy {
    /// Get the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadStrategy::Reject => "reject",
            PayloadStrategy::Sanitize => "sanitize",
            PayloadStrategy::RejectThenSanitize => "both",
        }
    }
}

impl fmt::Display for PayloadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an invalid payload strategy string.
#[derive(Debug, Clone)]
pub struct InvalidPayloadStrategyError(String);

impl fmt::Display for InvalidPayloadStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid payload strategy '{}', expected one of: reject, sanitize, both",
            self.0
        )
    }
}

impl std::error::Error for InvalidPayloadStrategyError {}

impl FromStr for PayloadStrategy {
    type Err = InvalidPayloadStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" | "validate" => Ok(PayloadStrategy::Reject),
            "sanitize" => Ok(PayloadStrategy::Sanitize),
            "both" | "reject_then_sanitize" => Ok(PayloadStrategy::RejectThenSanitize),
            _ => Err(InvalidPayloadStrategyError(s.to_string())),
        }
    }
}

/// Gatekeeper a repository consults before building any storage operation.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    policy: ValidationPolicy,
    strategy: PayloadStrategy,
    strict_keys: bool,
}

impl AccessGuard {
    /// Create a guard from a policy and payload strategy.
    pub fn new(policy: ValidationPolicy, strategy: PayloadStrategy) -> Self {
        Self {
            policy,
            strategy,
            strict_keys: false,
        }
    }

    /// Build the guard described by a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: ValidationPolicy::from_config(config),
            strategy: config.payload_strategy,
            strict_keys: config.strict_keys,
        }
    }

    /// Refuse payloads whose keys collide after sanitization.
    pub fn with_strict_keys(mut self, strict_keys: bool) -> Self {
        self.strict_keys = strict_keys;
        self
    }

    /// The policy this guard enforces.
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// The configured payload strategy.
    pub fn strategy(&self) -> PayloadStrategy {
        self.strategy
    }

    /// Gate a table name.
    pub fn table<'a>(&self, name: &'a str) -> Result<&'a str, GuardError> {
        self.identifier("table", name)
    }

    /// Gate a column name.
    pub fn column<'a>(&self, name: &'a str) -> Result<&'a str, GuardError> {
        self.identifier("column", name)
    }

    fn identifier<'a>(&self, kind: &str, name: &'a str) -> Result<&'a str, GuardError> {
        if self.policy.is_valid_identifier(name) {
            debug!("Accepted {} name: {}", kind, truncate_for_log(name));
            Ok(name)
        } else {
            warn!("Rejected {} name", kind);
            Err(GuardError::InvalidIdentifier)
        }
    }

    /// Gate a record id and return it parsed.
    pub fn record_id(&self, id: &Value) -> Result<RecordId, GuardError> {
        RecordId::from_value(id).ok_or_else(|| {
            warn!("Rejected record id");
            GuardError::InvalidRecordId
        })
    }

    /// Gate filter criteria.
    pub fn filter<'a>(&self, criteria: &'a Value) -> Result<&'a Value, GuardError> {
        if self.policy.is_valid_query_params(criteria) {
            Ok(criteria)
        } else {
            warn!("Rejected filter criteria");
            Err(GuardError::RejectedFilter)
        }
    }

    /// Prepare a write payload according to the configured strategy.
    ///
    /// Under [`PayloadStrategy::Sanitize`] a whitelist never causes a
    /// refusal: fields it does not name are dropped at every object level
    /// before the rest is rewritten.
    pub fn payload(
        &self,
        data: &Value,
        allowed: Option<&FieldWhitelist>,
    ) -> Result<Value, GuardError> {
        match self.strategy {
            PayloadStrategy::Reject => {
                self.check_payload(data, allowed)?;
                Ok(data.clone())
            }
            PayloadStrategy::Sanitize => self.sanitize_fields(data, allowed),
            PayloadStrategy::RejectThenSanitize => {
                self.check_payload(data, allowed)?;
                self.sanitize(data)
            }
        }
    }

    /// Sanitize a value, honouring the strict-keys setting.
    pub fn sanitize(&self, data: &Value) -> Result<Value, GuardError> {
        self.sanitize_fields(data, None)
    }

    fn sanitize_fields(
        &self,
        data: &Value,
        allowed: Option<&FieldWhitelist>,
    ) -> Result<Value, GuardError> {
        let sanitizer = self.policy.sanitizer();
        if self.strict_keys {
            sanitizer
                .sanitize_fields_strict(data, allowed)
                .inspect_err(|e| {
                    warn!("Rejected payload during sanitization: {}", e);
                })
        } else {
            Ok(sanitizer.sanitize_fields(data, allowed))
        }
    }

    fn check_payload(&self, data: &Value, allowed: Option<&FieldWhitelist>) -> Result<(), GuardError> {
        if self.policy.is_valid_for_storage(data, allowed) {
            Ok(())
        } else {
            warn!("Rejected write payload");
            Err(GuardError::RejectedPayload)
        }
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str) -> String {
    if s.chars().count() <= LOG_TRUNCATE_LENGTH {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(LOG_TRUNCATE_LENGTH).collect();
        format!("{}...", truncated)
    }
}
