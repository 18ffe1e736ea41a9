//! Error types for the shop database guard.
//!
//! The core validators answer with plain booleans. These errors exist for the
//! caller-facing side: the access guard, the strict sanitizer and configuration
//! loading. Rejection variants name the kind of input that was refused, never
//! the rule that refused it.

use thiserror::Error;

/// Errors raised when guarded input is refused or the guard is misconfigured.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Table or column name failed the identifier check
    #[error("Invalid identifier")]
    InvalidIdentifier,

    /// Record id is not a positive safe integer
    #[error("Invalid record id")]
    InvalidRecordId,

    /// Filter criteria were refused
    #[error("Filter criteria rejected")]
    RejectedFilter,

    /// Write payload was refused
    #[error("Payload rejected")]
    RejectedPayload,

    /// Two keys of one mapping sanitize to the same key
    #[error("Sanitized key collision on '{0}'")]
    KeyCollision(String),

    /// Input nesting exceeds the configured maximum
    #[error("Input nesting exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GuardError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a key collision error.
    pub fn key_collision(key: impl Into<String>) -> Self {
        Self::KeyCollision(key.into())
    }

    /// Create a depth exceeded error.
    pub fn depth_exceeded(max_depth: usize) -> Self {
        Self::DepthExceeded { max_depth }
    }

    /// Check if the error stems from caller input and should surface as a bad request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Get a user-friendly suggestion for how to fix this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIdentifier => {
                Some("Use letters, digits and underscores, not starting with a digit")
            }
            Self::InvalidRecordId => Some("Record ids are positive whole numbers"),
            Self::RejectedFilter | Self::RejectedPayload => {
                Some("Remove quotes, comment markers and command keywords from the input")
            }
            Self::KeyCollision(_) => Some("Rename fields so they differ in letters or digits"),
            Self::DepthExceeded { .. } => Some("Flatten the nested input"),
            Self::Config(_) => Some("Check your environment variables and configuration"),
        }
    }
}
