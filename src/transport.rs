//! Line-delimited JSON protocol for the checker binary.
//!
//! Each input line is one request; each output line is one response. This
//! lets services written in other languages consult the guard over stdio.

use crate::access::AccessGuard;
use crate::security::FieldWhitelist;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// A single check request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Table or column name check
    Identifier {
        #[serde(default)]
        value: Value,
    },
    /// Record id check
    RecordId {
        #[serde(default)]
        value: Value,
    },
    /// Filter map check
    QueryParams {
        #[serde(default)]
        value: Value,
    },
    /// Write payload check
    Storage {
        #[serde(default)]
        value: Value,
        #[serde(default)]
        allowed_fields: Option<Vec<String>>,
    },
    /// Sanitizing rewrite
    Sanitize {
        #[serde(default)]
        value: Value,
    },
}

/// Reply to a single request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn verdict(ok: bool) -> Self {
        Self {
            ok,
            value: None,
            error: None,
        }
    }

    fn value(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(message.into()),
        }
    }
}

/// Answer one request.
pub fn handle_request(guard: &AccessGuard, request: Request) -> Response {
    let policy = guard.policy();
    match request {
        Request::Identifier { value } => Response::verdict(policy.is_valid_identifier_value(&value)),
        Request::RecordId { value } => Response::verdict(policy.is_valid_id(&value)),
        Request::QueryParams { value } => Response::verdict(policy.is_valid_query_params(&value)),
        Request::Storage {
            value,
            allowed_fields,
        } => {
            let allowed = allowed_fields.map(FieldWhitelist::new);
            Response::verdict(policy.is_valid_for_storage(&value, allowed.as_ref()))
        }
        Request::Sanitize { value } => match guard.sanitize(&value) {
            Ok(clean) => Response::value(clean),
            Err(e) => Response::error(e.to_string()),
        },
    }
}

/// Parse and answer one input line.
pub fn handle_line(guard: &AccessGuard, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(guard, request),
        Err(e) => {
            debug!("Malformed request: {}", e);
            Response::error(format!("Malformed request: {}", e))
        }
    }
}

/// Serve requests from `input` until end of stream, writing one reply per line.
///
/// Blank lines are skipped. Returns the number of requests answered.
pub fn serve<R: BufRead, W: Write>(
    guard: &AccessGuard,
    input: R,
    mut output: W,
) -> std::io::Result<usize> {
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(guard, &line);
        let encoded = serde_json::to_string(&response).unwrap_or_else(|e| {
            warn!("Failed to serialize response: {}", e);
            r#"{"ok":false,"error":"Internal error"}"#.to_string()
        });
        writeln!(output, "{}", encoded)?;
        output.flush()?;
        answered += 1;
    }

    Ok(answered)
}
