//! Recursive-descent matching over the expression graph.
//!
//! Ordered choice with unlimited backtracking and no memoisation: simple,
//! predictable, and exponential in the worst case. A failed match is `None`
//! and is never an error.

use super::{Combinator, ExprGraph};
use crate::base::{ExprId, TextSize};
use crate::node::Node;

impl ExprGraph {
    /// Try to match expression `id` against `text` starting exactly at byte `pos`.
    ///
    /// Returns `None` when the expression does not match, when `pos` is not
    /// a char boundary inside `text`, or when `text` is too long for
    /// [`TextSize`] offsets.
    pub fn match_at<'a>(&'a self, id: ExprId, text: &'a str, pos: usize) -> Option<Node<'a>> {
        TextSize::try_from(text.len()).ok()?;
        if !text.is_char_boundary(pos) {
            return None;
        }
        self.match_expr(id, text, TextSize::try_from(pos).ok()?)
    }

    pub(crate) fn match_expr<'a>(
        &'a self,
        id: ExprId,
        text: &'a str,
        pos: TextSize,
    ) -> Option<Node<'a>> {
        let expr = &self[id];
        let rest = &text[usize::from(pos)..];

        match expr.combinator() {
            Combinator::Literal(literal) => {
                if !rest.starts_with(literal.as_str()) {
                    return None;
                }
                let end = pos + TextSize::of(literal.as_str());
                Some(Node::new(expr, text, pos, end, Vec::new()))
            }
            Combinator::Regex(pattern) => {
                let len = pattern.match_len(rest)?;
                let end = pos + TextSize::try_from(len).ok()?;
                Some(Node::new(expr, text, pos, end, Vec::new()))
            }
            Combinator::Sequence(members) => {
                let mut children = Vec::with_capacity(members.len());
                let mut cursor = pos;
                for &member in members {
                    let node = self.match_expr(member, text, cursor)?;
                    cursor = node.range().end();
                    children.push(node);
                }
                Some(Node::new(expr, text, pos, cursor, children))
            }
            Combinator::OneOf(members) => members.iter().find_map(|&member| {
                let node = self.match_expr(member, text, pos)?;
                let end = node.range().end();
                Some(Node::new(expr, text, pos, end, vec![node]))
            }),
            Combinator::Optional(member) => Some(match self.match_expr(*member, text, pos) {
                Some(node) => {
                    let end = node.range().end();
                    Node::new(expr, text, pos, end, vec![node])
                }
                None => Node::empty(expr, text, pos),
            }),
            Combinator::ZeroOrMore(member) => {
                let (children, end) = self.repeat(*member, text, pos);
                Some(Node::new(expr, text, pos, end, children))
            }
            Combinator::OneOrMore { member, min } => {
                let (children, end) = self.repeat(*member, text, pos);
                if children.len() < *min {
                    return None;
                }
                Some(Node::new(expr, text, pos, end, children))
            }
            Combinator::Lookahead(member) => {
                self.match_expr(*member, text, pos)?;
                Some(Node::empty(expr, text, pos))
            }
            Combinator::Not(member) => match self.match_expr(*member, text, pos) {
                Some(_) => None,
                None => Some(Node::empty(expr, text, pos)),
            },
            Combinator::LazyReference(reference) => unreachable!(
                "unresolved reference to rule `{}` reached during matching",
                reference.rule()
            ),
        }
    }

    /// Match `member` repeatedly until it fails or matches zero-width.
    ///
    /// A zero-width match ends the loop and is not kept as a child.
    fn repeat<'a>(&'a self, member: ExprId, text: &'a str, pos: TextSize) -> (Vec<Node<'a>>, TextSize) {
        let mut children = Vec::new();
        let mut cursor = pos;
        while let Some(node) = self.match_expr(member, text, cursor) {
            if node.is_empty() {
                break;
            }
            cursor = node.range().end();
            children.push(node);
        }
        (children, cursor)
    }
}
