//! Sanitizing rewrite of payload values.
//!
//! Unlike the validators this never rejects. Strings are scrubbed, object keys
//! are reduced to identifier characters, and the overall shape is kept.
//!
//! Keywords are removed as whole words only, so `selection` survives here even
//! though the injection detector flags it. A word is a run of `[A-Za-z0-9_]`;
//! every other character, accented letters included, is a boundary.
//!
//! The string scrub runs in time linear in its input. Fragments are removed
//! with a stack over the output buffer, so nested markers such as `//**` fall
//! away in one pass rather than one layer per pass.

use super::structure::FieldWhitelist;
use crate::constants::{
    LONGEST_SANITIZE_KEYWORD, SANITIZE_KEYWORDS, SANITIZE_KEYWORD_PAIRS,
    SANITIZE_STRIPPED_FRAGMENTS,
};
use crate::error::GuardError;
use serde_json::{Map, Value};
use tracing::warn;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Double every single quote that is not already doubled.
///
/// Runs of even length are left alone and odd runs gain one quote, so the
/// result never contains a lone quote and escaping twice changes nothing.
fn escape_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            out.push_str("''");
        } else {
            out.push(c);
        }
    }

    out
}

/// Push `c`, then drop a fragment if the buffer now ends with one.
///
/// The buffer never holds a fragment before the push, so only its tail needs
/// checking.
fn push_stripping(buffer: &mut String, c: char) {
    buffer.push(c);
    let matched = SANITIZE_STRIPPED_FRAGMENTS
        .iter()
        .find(|fragment| buffer.ends_with(**fragment))
        .map(|fragment| fragment.len());
    if let Some(len) = matched {
        buffer.truncate(buffer.len() - len);
    }
}

/// Remove comment markers and statement separators, including any that only
/// form once an inner one is gone (`-/**/-`).
fn strip_fragments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        push_stripping(&mut out, c);
    }
    out
}

/// Output buffer for the keyword scrub.
struct KeywordScrubber {
    out: String,
    /// Where a removed pair head (`UNION`) stood, and the word that would
    /// complete the pair. Cleared by anything but whitespace.
    pending_pair: Option<(usize, &'static str)>,
}

impl KeywordScrubber {
    fn new(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending_pair: None,
        }
    }

    fn push(&mut self, c: char) {
        if is_word_char(c) {
            self.out.push(c);
            return;
        }

        self.finish_word();
        if !c.is_whitespace() {
            self.pending_pair = None;
        }
        // Removing `SELECT` from `-SELECT-` leaves `--`
        push_stripping(&mut self.out, c);
        if matches!(self.pending_pair, Some((at, _)) if self.out.len() < at) {
            self.pending_pair = None;
        }
    }

    /// Check the word at the end of the buffer, if any, and drop it when it
    /// is a keyword.
    fn finish_word(&mut self) {
        // Word chars are ASCII, so a char count is also a byte count
        let len = self
            .out
            .bytes()
            .rev()
            .take(LONGEST_SANITIZE_KEYWORD + 1)
            .take_while(|b| is_word_char(char::from(*b)))
            .count();
        if len == 0 {
            return;
        }

        let pending = self.pending_pair.take();
        if len > LONGEST_SANITIZE_KEYWORD {
            return;
        }

        let start = self.out.len() - len;
        let word = &self.out[start..];

        if let Some((at, tail)) = pending {
            if start > at && word.eq_ignore_ascii_case(tail) {
                self.out.truncate(at);
                return;
            }
        }

        if SANITIZE_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
            self.pending_pair = SANITIZE_KEYWORD_PAIRS
                .iter()
                .find(|(head, _)| head.eq_ignore_ascii_case(word))
                .map(|(_, tail)| (start, *tail));
            self.out.truncate(start);
        }
    }

    fn finish(mut self) -> String {
        self.finish_word();
        self.out
    }
}

/// Remove whole-word keywords from fragment-free text.
///
/// A removal can glue two fragment halves together (`-SELECT-`) and that in
/// turn can glue two word halves together (`DR-SELECT-OP`). Both are handled
/// as the buffer grows, so each input char is pushed once.
fn strip_keywords(input: &str) -> String {
    let mut scrubber = KeywordScrubber::new(input.len());
    for c in input.chars() {
        scrubber.push(c);
    }
    scrubber.finish()
}

/// Sanitize a single string.
///
/// # Examples
///
/// ```
/// use shopdb_guard::security::sanitize_string;
///
/// assert_eq!(sanitize_string("O'Brien; SELECT * FROM x"), "O''Brien  * FROM x");
/// assert_eq!(sanitize_string("  a fine selection "), "a fine selection");
/// ```
pub fn sanitize_string(input: &str) -> String {
    let escaped = escape_quotes(input);
    strip_keywords(&strip_fragments(&escaped)).trim().to_string()
}

/// Reduce a key to `[A-Za-z0-9_]`, prefixing `_` if it would start with a digit.
pub fn sanitize_key(key: &str) -> String {
    let mut clean: String = key
        .chars()
        .filter(|c| is_word_char(*c))
        .collect();

    if clean.starts_with(|c: char| c.is_ascii_digit()) {
        clean.insert(0, '_');
    }

    clean
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Truncate over-deep values, last write wins on key collision
    Lenient,
    /// Error on over-deep values and key collisions
    Strict,
}

/// Recursive rewriter with a nesting limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitizer {
    max_depth: usize,
}

impl Sanitizer {
    /// Create a sanitizer that descends at most `max_depth` containers.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum container nesting.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Rewrite a value. Never fails.
    ///
    /// Containers nested deeper than the limit become `null`. When two keys of
    /// one object sanitize to the same key, the later one in the object's
    /// iteration order wins and a warning is logged.
    pub fn sanitize(&self, data: &Value) -> Value {
        self.sanitize_fields(data, None)
    }

    /// Rewrite a value, refusing key collisions and over-deep nesting.
    pub fn sanitize_strict(&self, data: &Value) -> Result<Value, GuardError> {
        self.sanitize_fields_strict(data, None)
    }

    /// Like [`sanitize`](Self::sanitize), but fields missing from `allowed`
    /// are dropped.
    ///
    /// The whitelist applies to object keys at every level reached through
    /// objects, as in the structural validator. Keys are compared before
    /// they are sanitized. Array elements are rewritten but not filtered.
    pub fn sanitize_fields(&self, data: &Value, allowed: Option<&FieldWhitelist>) -> Value {
        // Lenient mode has no error path
        self.rewrite(data, 1, Mode::Lenient, allowed)
            .unwrap_or(Value::Null)
    }

    /// Strict counterpart of [`sanitize_fields`](Self::sanitize_fields).
    pub fn sanitize_fields_strict(
        &self,
        data: &Value,
        allowed: Option<&FieldWhitelist>,
    ) -> Result<Value, GuardError> {
        self.rewrite(data, 1, Mode::Strict, allowed)
    }

    fn rewrite(
        &self,
        value: &Value,
        depth: usize,
        mode: Mode,
        allowed: Option<&FieldWhitelist>,
    ) -> Result<Value, GuardError> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
            Value::String(s) => Ok(Value::String(sanitize_string(s))),
            Value::Array(items) => {
                if depth > self.max_depth {
                    return self.too_deep(mode);
                }
                items
                    .iter()
                    .map(|item| self.rewrite(item, depth + 1, mode, None))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Value::Object(map) => {
                if depth > self.max_depth {
                    return self.too_deep(mode);
                }
                self.rewrite_map(map, depth, mode, allowed)
                    .map(Value::Object)
            }
        }
    }

    fn rewrite_map(
        &self,
        map: &Map<String, Value>,
        depth: usize,
        mode: Mode,
        allowed: Option<&FieldWhitelist>,
    ) -> Result<Map<String, Value>, GuardError> {
        let mut out = Map::new();
        let mut dropped = 0usize;

        for (key, item) in map {
            if allowed.is_some_and(|fields| !fields.contains(key)) {
                dropped += 1;
                continue;
            }

            let clean_key = sanitize_key(key);
            if out.contains_key(&clean_key) {
                match mode {
                    Mode::Strict => return Err(GuardError::key_collision(clean_key)),
                    Mode::Lenient => {
                        warn!("Sanitized key '{}' collides; keeping the later value", clean_key)
                    }
                }
            }
            let clean = self.rewrite(item, depth + 1, mode, allowed)?;
            out.insert(clean_key, clean);
        }

        if dropped > 0 {
            warn!("Dropped {} field(s) outside the whitelist", dropped);
        }

        Ok(out)
    }

    fn too_deep(&self, mode: Mode) -> Result<Value, GuardError> {
        match mode {
            Mode::Lenient => Ok(Value::Null),
            Mode::Strict => Err(GuardError::depth_exceeded(self.max_depth)),
        }
    }
}
