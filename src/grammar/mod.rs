//! Grammar façade: compile grammar text, parse input against named rules.
//!
//! ## Pipeline
//!
//! ```text
//! grammar text
//!     ↓  meta grammar (`rules` rule)
//! meta-parse-tree
//!     ↓  RuleVisitor + resolution pass
//! Grammar { rule name → ExprId, ExprGraph }
//!     ↓  Grammar::parse
//! Node tree
//! ```
//!
//! The meta grammar is itself compiled from [`RULE_SYNTAX`] by
//! [`bootstrap()`], once per process.

pub mod bootstrap;
mod options;
mod visitor;

pub use bootstrap::{RULE_SYNTAX, bootstrap, hand_built};
pub use options::{CompileOptions, DuplicateRules};
pub use visitor::RuleVisitor;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::base::{ExprId, Name};
use crate::error::{CompileError, ParseError};
use crate::expr::{ExprGraph, Expression};
use crate::node::Node;

/// Entry rule of the grammar-description language.
pub const RULES: &str = "rules";

pub(crate) type RuleMap = IndexMap<Name, ExprId, FxBuildHasher>;

static META_GRAMMAR: Lazy<Result<Grammar, CompileError>> = Lazy::new(bootstrap);

/// A compiled grammar: named entry points into an immutable expression graph.
#[derive(Debug, Clone)]
pub struct Grammar {
    graph: ExprGraph,
    rules: RuleMap,
}

impl Grammar {
    /// Compile a grammar definition with default options.
    pub fn compile(definition: &str) -> Result<Self, CompileError> {
        Self::compile_with(definition, &CompileOptions::default())
    }

    pub fn compile_with(definition: &str, options: &CompileOptions) -> Result<Self, CompileError> {
        let meta = META_GRAMMAR.as_ref().map_err(Clone::clone)?;
        meta.compile_definition(definition, options)
    }

    /// Compile `definition` using `self` as the meta grammar.
    ///
    /// `self` must have a [`RULES`] rule producing the meta-parse-tree shape
    /// the [`RuleVisitor`] expects. The whole definition must be consumed.
    pub fn compile_definition(
        &self,
        definition: &str,
        options: &CompileOptions,
    ) -> Result<Grammar, CompileError> {
        let tree = self
            .parse(definition, RULES)
            .ok_or(CompileError::MalformedGrammar { offset: 0 })?;
        if tree.end() != definition.len() {
            return Err(CompileError::MalformedGrammar { offset: tree.end() });
        }
        Self::compile_tree(&tree, options)
    }

    /// Compile an already-parsed meta-parse-tree.
    pub fn compile_tree(tree: &Node<'_>, options: &CompileOptions) -> Result<Grammar, CompileError> {
        let grammar = RuleVisitor::new(options.clone()).visit_rules(tree)?;
        debug!(
            "[GRAMMAR] compiled {} rules into {} expressions",
            grammar.len(),
            grammar.graph.len()
        );
        Ok(grammar)
    }

    /// Wrap a finished graph and its rule entry points.
    ///
    /// Rejects duplicate names, handles outside the graph, and any lazy
    /// reference still reachable as a member or rule.
    pub fn from_rules(
        graph: ExprGraph,
        rules: impl IntoIterator<Item = (Name, ExprId)>,
    ) -> Result<Self, CompileError> {
        if let Some(member) = graph
            .iter()
            .flat_map(|(_, expr)| expr.members())
            .find(|member| graph.get(**member).is_none())
        {
            return Err(CompileError::internal(format!("dangling member {member}")));
        }
        if let Some(lazy) = graph.unresolved() {
            return Err(CompileError::internal(format!(
                "reference to `{}` left unresolved",
                lazy.rule()
            )));
        }

        let mut map = RuleMap::default();
        for (name, id) in rules {
            let expr = graph.get(id).ok_or_else(|| {
                CompileError::internal(format!("rule `{name}` points outside the graph"))
            })?;
            if let Some(lazy) = expr.as_lazy_reference() {
                return Err(CompileError::internal(format!(
                    "rule `{name}` is an unresolved reference to `{}`",
                    lazy.rule()
                )));
            }
            if map.contains_key(&name) {
                return Err(CompileError::duplicate(name));
            }
            map.insert(name, id);
        }

        Ok(Self { graph, rules: map })
    }

    /// Match `rule` at the start of `text`.
    ///
    /// Returns `None` both when the rule does not match and when the grammar
    /// has no rule of that name. The match need not consume all of `text`;
    /// see [`parse_complete`](Self::parse_complete) for that.
    pub fn parse<'a>(&'a self, text: &'a str, rule: &str) -> Option<Node<'a>> {
        let id = self.rule(rule)?;
        self.graph.match_at(id, text, 0)
    }

    /// Match `rule` against the entire `text`.
    pub fn parse_complete<'a>(&'a self, text: &'a str, rule: &str) -> Result<Node<'a>, ParseError> {
        let id = self
            .rule(rule)
            .ok_or_else(|| ParseError::UnknownRule { name: rule.into() })?;
        let node = self
            .graph
            .match_at(id, text, 0)
            .ok_or_else(|| ParseError::NoMatch { rule: rule.into() })?;
        if node.end() != text.len() {
            return Err(ParseError::Incomplete {
                rule: rule.into(),
                consumed: node.end(),
                len: text.len(),
            });
        }
        Ok(node)
    }

    pub fn rule(&self, name: &str) -> Option<ExprId> {
        self.rules.get(name).copied()
    }

    pub fn contains_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names in definition order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(Name::as_str)
    }

    pub fn expression(&self, id: ExprId) -> Option<&Expression> {
        self.graph.get(id)
    }

    pub fn graph(&self) -> &ExprGraph {
        &self.graph
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
