//! # pegraph
//!
//! A self-hosting Parsing Expression Grammar engine.
//!
//! Grammar text is compiled into an expression graph, which is then used to
//! parse arbitrary input into a [`Node`] tree. The grammar-description
//! language is itself a PEG: a hand-built graph parses its textual
//! self-description, and the [`RuleVisitor`](grammar::RuleVisitor) compiles
//! that meta-parse-tree into the graph every later grammar is compiled with.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! grammar   → Grammar façade, bootstrap graph, rule visitor (compiler)
//!   ↓
//! expr      → Expression arena, combinators, matching algorithm
//!   ↓
//! node      → Parse tree with read-only traversal
//!   ↓
//! base      → ExprId handles, names, text spans
//! ```
//!
//! ## Example
//!
//! ```
//! use pegraph::Grammar;
//!
//! let grammar = Grammar::compile(r#"
//!     greeting = "hello" _ name
//!     name = ~"[a-z]+"
//!     _ = ~"\s*"
//! "#).unwrap();
//!
//! let tree = grammar.parse("hello world", "greeting").unwrap();
//! assert_eq!(tree.children().len(), 3);
//! assert_eq!(tree.child(2).unwrap().text(), "world");
//! ```

// ============================================================================
// MODULES (dependency order: base → node → expr → grammar)
// ============================================================================

/// Foundation types: ExprId handles, names, text spans
pub mod base;

/// Error types for compilation and complete-input parsing
pub mod error;

/// Expression graph: combinators and the matching algorithm
pub mod expr;

/// Grammar façade, bootstrap grammar and rule visitor
pub mod grammar;

/// Parse tree produced by a successful match
pub mod node;

// Re-export foundation types
pub use base::{ExprId, Name, TextRange, TextSize};

pub use error::{CompileError, ParseError};
pub use expr::{Combinator, ExprGraph, ExprKind, Expression, Pattern};
pub use grammar::{CompileOptions, DuplicateRules, Grammar, bootstrap};
pub use node::Node;
