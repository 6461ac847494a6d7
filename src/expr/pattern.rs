//! Anchored regex patterns.

use std::fmt;

use regex::Regex;
use tracing::trace;

use crate::error::CompileError;

/// A compiled regex that only ever matches at the start of its haystack.
///
/// The source pattern is wrapped as `\A(?flags:pattern)` and matched against
/// the remainder of the input, so a match always begins exactly at the
/// current position. `\A` (rather than `^`) keeps the `m` flag from letting
/// the match start at a later line.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` with the grammar-language flag letters in `flags`.
    ///
    /// `i`, `m`, `s`, `x` and `u` map onto the regex engine's inline flags
    /// (case-insensitively). `l` and `a` are accepted and ignored.
    pub fn new(source: &str, flags: &str) -> Result<Self, CompileError> {
        let mut inline = String::new();
        for flag in flags.chars().map(|c| c.to_ascii_lowercase()) {
            match flag {
                'i' | 'm' | 's' | 'x' | 'u' => {
                    if !inline.contains(flag) {
                        inline.push(flag);
                    }
                }
                'l' | 'a' => trace!("[PATTERN] ignoring flag {:?} on {:?}", flag, source),
                _ => return Err(CompileError::UnsupportedRegexFlag { flag }),
            }
        }

        let anchored = if inline.is_empty() {
            format!(r"\A(?:{source})")
        } else if inline.contains('x') {
            // a trailing `#` comment would otherwise swallow the closing paren
            format!("\\A(?{inline}:{source}\n)")
        } else {
            format!(r"\A(?{inline}:{source})")
        };
        let regex = Regex::new(&anchored).map_err(|err| CompileError::invalid_regex(source, &err))?;

        Ok(Self {
            source: source.to_string(),
            flags: inline,
            regex,
        })
    }

    /// The pattern as written, without anchoring or flags.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Normalised inline flags applied to the pattern.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Length in bytes of the match at the very start of `haystack`.
    pub fn match_len(&self, haystack: &str) -> Option<usize> {
        self.regex.find(haystack).map(|m| m.end())
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("flags", &self.flags)
            .finish()
    }
}
