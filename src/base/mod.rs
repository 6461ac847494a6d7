//! Foundation types for the expression graph.
//!
//! This module provides the primitives used throughout the engine:
//! - [`ExprId`] - Handle of an expression inside an [`ExprGraph`](crate::ExprGraph)
//! - [`Name`] - Rule and expression names
//! - [`TextRange`], [`TextSize`] - Byte spans of parse-tree nodes
//!
//! This module has NO dependencies on other pegraph modules.

use std::fmt;

/// Rule or expression name. Empty for anonymous (inline) expressions.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};

/// Index of an expression in its owning graph.
///
/// Handles are only meaningful for the graph that issued them. Several
/// parents may hold the same handle; that is how a rule referenced from
/// many places (or from itself) is shared without duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(u32);

impl ExprId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or_else(|_| panic!("expression graph overflow at {index}")))
    }

    /// Position of the expression in the graph's storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_id_roundtrips_index() {
        let id = ExprId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "#42");
    }

    #[test]
    fn test_expr_id_ordering_follows_allocation() {
        assert!(ExprId::new(1) < ExprId::new(2));
    }
}
