//! Expression graph: the executable form of a grammar.
//!
//! Expressions live in an index-addressed arena ([`ExprGraph`]) and refer to
//! their members through [`ExprId`] handles. Storage stays acyclic while the
//! logical graph may contain back-edges: a self-recursive rule simply holds
//! its own handle somewhere below itself.
//!
//! ## Construction vs. use
//!
//! All mutation (`add`, `set_name`, `insert_member`, reference patching)
//! happens while a grammar is being built. Once a [`Grammar`](crate::Grammar)
//! owns the graph it is only read, so matching needs no synchronisation.
//!
//! ## Lazy references
//!
//! A rule may be referenced before it is defined. The compiler emits a
//! [`Combinator::LazyReference`] placeholder, which records the parent slot
//! it occupies when that parent is added to the graph. The resolution pass
//! then overwrites exactly that slot with the target rule's handle.

mod matching;
mod pattern;

pub use pattern::Pattern;

use std::fmt;
use std::ops::Index;

use crate::base::{ExprId, Name};
use crate::error::CompileError;

/// Kind tag of an expression, shared by the expression and its parse nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Regex,
    Sequence,
    OneOf,
    Optional,
    ZeroOrMore,
    OneOrMore,
    Lookahead,
    Not,
    LazyReference,
}

impl ExprKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Regex => "regex",
            Self::Sequence => "sequence",
            Self::OneOf => "one_of",
            Self::Optional => "optional",
            Self::ZeroOrMore => "zero_or_more",
            Self::OneOrMore => "one_or_more",
            Self::Lookahead => "lookahead",
            Self::Not => "not",
            Self::LazyReference => "lazy_reference",
        }
    }

    /// Sequence and OneOf: an ordered list of members.
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Sequence | Self::OneOf)
    }

    /// Variants wrapping exactly one member.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::Optional | Self::ZeroOrMore | Self::OneOrMore | Self::Lookahead | Self::Not
        )
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a lazy reference sits: the parent expression and the member index
/// inside it (always 0 for unary parents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub parent: ExprId,
    pub index: usize,
}

/// Placeholder for a rule that is not known yet at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyReference {
    rule: Name,
    slot: Option<Slot>,
}

impl LazyReference {
    /// Name of the referenced rule.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Parent slot, known once the parent has been added to the graph.
    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }
}

/// The closed set of combinators.
#[derive(Debug, Clone)]
pub enum Combinator {
    /// Matches the string verbatim.
    Literal(String),
    /// Matches the pattern anchored at the current position.
    Regex(Pattern),
    Sequence(Vec<ExprId>),
    /// Ordered choice: the first member that matches wins.
    OneOf(Vec<ExprId>),
    Optional(ExprId),
    ZeroOrMore(ExprId),
    /// Fails when fewer than `min` repetitions match.
    OneOrMore { member: ExprId, min: usize },
    Lookahead(ExprId),
    Not(ExprId),
    LazyReference(LazyReference),
}

impl Combinator {
    pub fn kind(&self) -> ExprKind {
        match self {
            Self::Literal(_) => ExprKind::Literal,
            Self::Regex(_) => ExprKind::Regex,
            Self::Sequence(_) => ExprKind::Sequence,
            Self::OneOf(_) => ExprKind::OneOf,
            Self::Optional(_) => ExprKind::Optional,
            Self::ZeroOrMore(_) => ExprKind::ZeroOrMore,
            Self::OneOrMore { .. } => ExprKind::OneOrMore,
            Self::Lookahead(_) => ExprKind::Lookahead,
            Self::Not(_) => ExprKind::Not,
            Self::LazyReference(_) => ExprKind::LazyReference,
        }
    }

    fn members(&self) -> &[ExprId] {
        match self {
            Self::Sequence(members) | Self::OneOf(members) => members,
            Self::Optional(member)
            | Self::ZeroOrMore(member)
            | Self::OneOrMore { member, .. }
            | Self::Lookahead(member)
            | Self::Not(member) => std::slice::from_ref(member),
            Self::Literal(_) | Self::Regex(_) | Self::LazyReference(_) => &[],
        }
    }

    fn member_mut(&mut self, index: usize) -> Option<&mut ExprId> {
        match self {
            Self::Sequence(members) | Self::OneOf(members) => members.get_mut(index),
            Self::Optional(member)
            | Self::ZeroOrMore(member)
            | Self::OneOrMore { member, .. }
            | Self::Lookahead(member)
            | Self::Not(member) => (index == 0).then_some(member),
            Self::Literal(_) | Self::Regex(_) | Self::LazyReference(_) => None,
        }
    }
}

/// A node of the expression graph.
#[derive(Debug, Clone)]
pub struct Expression {
    name: Name,
    combinator: Combinator,
}

impl Expression {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            name: Name::default(),
            combinator,
        }
    }

    pub fn literal(literal: impl Into<String>) -> Self {
        Self::new(Combinator::Literal(literal.into()))
    }

    /// Compile `pattern` with inline `flags` (see [`Pattern::new`]).
    pub fn regex(pattern: &str, flags: &str) -> Result<Self, CompileError> {
        Pattern::new(pattern, flags).map(|p| Self::new(Combinator::Regex(p)))
    }

    pub fn sequence(members: Vec<ExprId>) -> Self {
        Self::new(Combinator::Sequence(members))
    }

    pub fn one_of(members: Vec<ExprId>) -> Self {
        Self::new(Combinator::OneOf(members))
    }

    pub fn optional(member: ExprId) -> Self {
        Self::new(Combinator::Optional(member))
    }

    pub fn zero_or_more(member: ExprId) -> Self {
        Self::new(Combinator::ZeroOrMore(member))
    }

    pub fn one_or_more(member: ExprId) -> Self {
        Self::repeated(member, 1)
    }

    /// Repetition that requires at least `min` matches.
    pub fn repeated(member: ExprId, min: usize) -> Self {
        Self::new(Combinator::OneOrMore { member, min })
    }

    pub fn lookahead(member: ExprId) -> Self {
        Self::new(Combinator::Lookahead(member))
    }

    pub fn not(member: ExprId) -> Self {
        Self::new(Combinator::Not(member))
    }

    pub fn lazy_reference(rule: impl Into<Name>) -> Self {
        Self::new(Combinator::LazyReference(LazyReference {
            rule: rule.into(),
            slot: None,
        }))
    }

    pub fn named(mut self, name: impl Into<Name>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ExprKind {
        self.combinator.kind()
    }

    pub fn combinator(&self) -> &Combinator {
        &self.combinator
    }

    /// Member handles in order. Empty for leaves and lazy references.
    pub fn members(&self) -> &[ExprId] {
        self.combinator.members()
    }

    pub fn as_lazy_reference(&self) -> Option<&LazyReference> {
        match &self.combinator {
            Combinator::LazyReference(reference) => Some(reference),
            _ => None,
        }
    }
}

/// Arena owning every expression of a grammar.
#[derive(Debug, Clone, Default)]
pub struct ExprGraph {
    exprs: Vec<Expression>,
}

impl ExprGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expression and return its handle.
    ///
    /// Any lazy reference among the new expression's members learns its
    /// parent slot here.
    pub fn add(&mut self, expr: Expression) -> ExprId {
        let id = ExprId::new(self.exprs.len());
        self.exprs.push(expr);
        self.link_members(id);
        id
    }

    pub fn get(&self, id: ExprId) -> Option<&Expression> {
        self.exprs.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Expression)> + '_ {
        self.exprs
            .iter()
            .enumerate()
            .map(|(index, expr)| (ExprId::new(index), expr))
    }

    pub fn set_name(&mut self, id: ExprId, name: impl Into<Name>) {
        if let Some(expr) = self.exprs.get_mut(id.index()) {
            expr.name = name.into();
        }
    }

    /// Splice `member` into a Sequence/OneOf at `index`.
    ///
    /// Needed when a compound's member list can only be completed after
    /// one of its members (which refers back to it) has been built.
    pub fn insert_member(
        &mut self,
        parent: ExprId,
        index: usize,
        member: ExprId,
    ) -> Result<(), CompileError> {
        let expr = self
            .exprs
            .get_mut(parent.index())
            .ok_or_else(|| CompileError::internal(format!("no expression {parent}")))?;
        match &mut expr.combinator {
            Combinator::Sequence(members) | Combinator::OneOf(members) if index <= members.len() => {
                members.insert(index, member);
            }
            other => {
                return Err(CompileError::internal(format!(
                    "cannot insert member {index} into {} {parent}",
                    other.kind()
                )));
            }
        }
        self.link_members(parent);
        Ok(())
    }

    /// Overwrite the slot recorded on lazy reference `reference` with `target`.
    pub(crate) fn patch(&mut self, reference: ExprId, target: ExprId) -> Result<(), CompileError> {
        let lazy = self
            .get(reference)
            .and_then(Expression::as_lazy_reference)
            .ok_or_else(|| CompileError::internal(format!("{reference} is not a lazy reference")))?;
        let slot = lazy.slot.ok_or_else(|| {
            CompileError::internal(format!("lazy reference to `{}` has no parent slot", lazy.rule))
        })?;

        let member = self
            .exprs
            .get_mut(slot.parent.index())
            .and_then(|parent| parent.combinator.member_mut(slot.index))
            .ok_or_else(|| CompileError::internal(format!("dangling slot {slot:?}")))?;
        if *member != reference {
            return Err(CompileError::internal(format!(
                "slot {slot:?} no longer holds {reference}"
            )));
        }
        *member = target;
        Ok(())
    }

    /// First lazy reference still held as a member by some expression.
    pub fn unresolved(&self) -> Option<&LazyReference> {
        self.exprs
            .iter()
            .flat_map(Expression::members)
            .find_map(|&member| self.get(member)?.as_lazy_reference())
    }

    fn link_members(&mut self, parent: ExprId) {
        let members = self.exprs[parent.index()].members().to_vec();
        for (index, member) in members.into_iter().enumerate() {
            if let Some(Combinator::LazyReference(lazy)) = self
                .exprs
                .get_mut(member.index())
                .map(|expr| &mut expr.combinator)
            {
                lazy.slot = Some(Slot { parent, index });
            }
        }
    }
}

impl Index<ExprId> for ExprGraph {
    type Output = Expression;

    fn index(&self, id: ExprId) -> &Expression {
        &self.exprs[id.index()]
    }
}

#[cfg(test)]
mod tests;
