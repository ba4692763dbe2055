//! Glob pattern matching for role definitions
//!
//! Role configuration names users and resources with glob patterns
//! (`*`, `?`, `[set]`, `[!set]`). Patterns are compiled once at bake time
//! into anchored regexes; matching is full-string and case-sensitive.

use crate::error::ConfigError;
use regex::Regex;
use std::fmt;

/// A compiled glob pattern
///
/// Immutable once compiled. Compilation is pure and deterministic; a
/// malformed pattern is a `ConfigError`, never a runtime panic.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a glob pattern
    ///
    /// `*` matches any sequence (including empty), `?` exactly one
    /// character, `[set]` one character in the set, `[!set]` one character
    /// outside it. Everything else matches verbatim.
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let translated = translate(pattern)?;
        let regex = Regex::new(&translated)
            .map_err(|e| ConfigError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Test a candidate against the whole pattern (no substring match)
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The original glob text
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Translate a glob into an anchored regex
fn translate(pattern: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("\\A");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push('^');
                }

                // A `]` directly after the opening (or the negation) is a
                // literal member, not the terminator.
                let mut members = 0usize;
                if chars.peek() == Some(&']') {
                    chars.next();
                    out.push_str("\\]");
                    members += 1;
                }

                let mut closed = false;
                for m in chars.by_ref() {
                    if m == ']' {
                        closed = true;
                        break;
                    }
                    push_class_char(&mut out, m);
                    members += 1;
                }

                if !closed {
                    return Err(ConfigError::invalid_pattern(
                        pattern,
                        "unterminated character class",
                    ));
                }
                if members == 0 {
                    return Err(ConfigError::invalid_pattern(
                        pattern,
                        "empty character class",
                    ));
                }
                out.push(']');
            }
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out.push_str("\\z");
    Ok(out)
}

/// Escape a character inside a class, keeping `-` available for ranges
fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '^' | ']' | '[') {
        out.push('\\');
    }
    out.push(c);
}
