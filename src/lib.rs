//! # Shop DB Guard
//!
//! Input validation and sanitization for the shop API's database access layer.
//!
//! This crate provides:
//! - **Identifier checks**: Table and column names against a grammar and reserved words
//! - **Record id checks**: Positive safe integers given as numbers or numeric strings
//! - **Structural checks**: Recursive validation of filter maps and write payloads
//! - **Sanitization**: Non-rejecting rewrite of payloads before storage
//!
//! ## Architecture
//!
//! The checks in [`security`] are pure functions over [`serde_json::Value`].
//! They answer `true` or `false` and never say why. [`AccessGuard`] turns
//! those answers into errors for a repository to propagate, and
//! [`transport`] exposes the same checks over a line-delimited JSON protocol.

pub mod access;
pub mod config;
pub mod constants;
pub mod error;
pub mod security;
pub mod transport;

pub use access::{AccessGuard, PayloadStrategy};
pub use config::Config;
pub use error::GuardError;
pub use security::ValidationPolicy;
