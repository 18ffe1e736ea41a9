//! Centralized constants for the shop database guard.
//!
//! Every word list and numeric limit used by the validators lives here so the
//! default policy can be read in one place.

// =============================================================================
// Identifier Constants
// =============================================================================

/// Words that may never be used as a table or column name, in any casing.
pub const RESERVED_WORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TABLE", "DATABASE",
    "INDEX", "WHERE", "FROM", "JOIN", "UNION",
];

// =============================================================================
// Record Id Constants
// =============================================================================

/// Largest integer exactly representable in an IEEE-754 double (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

// =============================================================================
// Injection Detection Constants
// =============================================================================

/// Fragments that mark a string value as suspicious.
///
/// Matched case-insensitively as plain substrings, so `selection` is flagged
/// because it contains `select`.
pub const INJECTION_TOKENS: &[&str] = &[
    "'", ";", "--", "/*", "*/", "xp_", "sp_", "exec", "execute", "select", "insert", "update",
    "delete", "drop", "create", "alter", "grant", "revoke", "backup", "restore", "shutdown",
];

// =============================================================================
// Sanitizer Constants
// =============================================================================

/// Keywords removed as whole words by the sanitizer.
///
/// Words are runs of `[A-Za-z0-9_]` and are compared ignoring ASCII case.
pub const SANITIZE_KEYWORDS: &[&str] = &[
    "ALTER", "CREATE", "DELETE", "DROP", "EXECUTE", "EXEC", "INSERT", "SELECT", "UNION",
    "UPDATE", "TRUNCATE", "USE",
];

/// Two-word keywords removed as one unit, together with the whitespace between
/// them. The first word must also be in [`SANITIZE_KEYWORDS`].
pub const SANITIZE_KEYWORD_PAIRS: &[(&str, &str)] = &[("UNION", "ALL")];

/// Length of the longest entry in [`SANITIZE_KEYWORDS`] or
/// [`SANITIZE_KEYWORD_PAIRS`]. Longer words are never compared.
pub const LONGEST_SANITIZE_KEYWORD: usize = 8;

/// Substrings removed verbatim by the sanitizer, in removal order.
pub const SANITIZE_STRIPPED_FRAGMENTS: &[&str] = &[";", "--", "/*", "*/"];

// =============================================================================
// Recursion Constants
// =============================================================================

/// Default maximum nesting depth for parameter maps and payloads.
pub const DEFAULT_MAX_DEPTH: usize = 32;

// =============================================================================
// Logging Constants
// =============================================================================

/// Truncation length for identifiers echoed into debug logs.
pub const LOG_TRUNCATE_LENGTH: usize = 64;
