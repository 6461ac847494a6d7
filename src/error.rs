//! Error types for grammar compilation and parsing.
//!
//! A failed match is not an error: matching returns `Option<Node>` and
//! absence is ordinary control flow. These types cover everything else.

use thiserror::Error;

use crate::base::Name;

/// Errors that can occur while compiling a grammar definition.
///
/// No partial grammar is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The definition text does not match the grammar-description language.
    #[error("Malformed grammar definition: parsing stopped at byte {offset}")]
    MalformedGrammar { offset: usize },

    /// A rule references a name that no rule defines.
    #[error("Unresolved reference: {name}")]
    UnresolvedReference { name: Name },

    /// The same rule name is defined more than once.
    #[error("Duplicate rule definition: {name}")]
    DuplicateRule { name: Name },

    /// The regex engine rejected a pattern.
    #[error("Invalid regex {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },

    /// A regex flag letter with no counterpart in the regex engine.
    #[error("Unsupported regex flag: {flag:?}")]
    UnsupportedRegexFlag { flag: char },

    /// A compiler invariant was broken. Indicates a bug, not bad input.
    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl CompileError {
    /// Create an internal invariant error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an unresolved reference error.
    pub fn unresolved(name: impl Into<Name>) -> Self {
        Self::UnresolvedReference { name: name.into() }
    }

    /// Create a duplicate rule error.
    pub fn duplicate(name: impl Into<Name>) -> Self {
        Self::DuplicateRule { name: name.into() }
    }

    /// Create an invalid regex error from the engine's rejection.
    pub fn invalid_regex(pattern: impl Into<String>, err: &regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }

    /// Check if this error indicates a bug in the compiler itself
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Errors from [`Grammar::parse_complete`](crate::Grammar::parse_complete).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar has no rule with this name.
    #[error("Unknown rule: {name}")]
    UnknownRule { name: Name },

    /// The rule did not match at the start of the input.
    #[error("Rule {rule} did not match")]
    NoMatch { rule: Name },

    /// The rule matched but left input unconsumed.
    #[error("Rule {rule} consumed {consumed} of {len} bytes")]
    Incomplete { rule: Name, consumed: usize, len: usize },
}
