//! Parse tree produced by a successful match.
//!
//! A [`Node`] borrows both the expression that produced it and the full
//! source text; its own text is the slice covered by its span. Nodes are
//! built bottom-up during one matching attempt and own their children.

use std::fmt;

use crate::base::{TextRange, TextSize};
use crate::expr::{ExprKind, Expression};

/// One successful match of an expression against a span of the input.
#[derive(Clone)]
pub struct Node<'a> {
    expr: &'a Expression,
    full_text: &'a str,
    range: TextRange,
    children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(
        expr: &'a Expression,
        full_text: &'a str,
        start: TextSize,
        end: TextSize,
        children: Vec<Node<'a>>,
    ) -> Self {
        Self {
            expr,
            full_text,
            range: TextRange::new(start, end),
            children,
        }
    }

    /// A zero-width, childless node at `pos`.
    pub(crate) fn empty(expr: &'a Expression, full_text: &'a str, pos: TextSize) -> Self {
        Self::new(expr, full_text, pos, pos, Vec::new())
    }

    /// The expression that produced this node.
    pub fn expression(&self) -> &'a Expression {
        self.expr
    }

    /// Name of the producing expression; empty for anonymous expressions.
    pub fn expr_name(&self) -> &'a str {
        self.expr.name()
    }

    pub fn kind(&self) -> ExprKind {
        self.expr.kind()
    }

    /// The matched slice of the source text.
    pub fn text(&self) -> &'a str {
        &self.full_text[self.range]
    }

    /// The whole source text this node was matched against.
    pub fn full_text(&self) -> &'a str {
        self.full_text
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Byte offset where the match starts.
    pub fn start(&self) -> usize {
        self.range.start().into()
    }

    /// Byte offset one past the end of the match.
    pub fn end(&self) -> usize {
        self.range.end().into()
    }

    pub fn len(&self) -> usize {
        self.range.len().into()
    }

    /// True for zero-width matches (lookahead, failed optional, empty repetition).
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn children(&self) -> &[Node<'a>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Node<'a>> {
        self.children.get(index)
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_, 'a> {
        Descendants { stack: vec![self] }
    }

    /// First node in pre-order whose expression carries `name`.
    pub fn find(&self, name: &str) -> Option<&Node<'a>> {
        self.descendants().find(|node| node.expr_name() == name)
    }
}

/// Structural equality: same matched text, same producing expression name
/// and kind, and pairwise-equal children. Offsets are not compared.
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
            && self.expr_name() == other.expr_name()
            && self.kind() == other.kind()
            && self.children == other.children
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.expr_name())
            .field("kind", &self.kind())
            .field("range", &self.range)
            .field("text", &self.text())
            .field("children", &self.children)
            .finish()
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'n, 'a> {
    stack: Vec<&'n Node<'a>>,
}

impl<'n, 'a> Iterator for Descendants<'n, 'a> {
    type Item = &'n Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
