//! Rule visitor: compiles a meta-parse-tree into an expression graph.
//!
//! One visit function per meta-grammar rule. Each checks the node it is
//! given was produced by that rule, then builds expressions bottom-up.
//! References become lazy placeholders collected in a worklist. The rule map
//! is complete before the resolution pass patches any of them, so rules may
//! refer forward, to each other, or to themselves.

use indexmap::map::Entry;
use tracing::{trace, warn};

use super::options::{CompileOptions, DuplicateRules};
use super::{Grammar, RuleMap};
use crate::base::{ExprId, Name};
use crate::error::CompileError;
use crate::expr::{ExprGraph, ExprKind, Expression};
use crate::node::Node;

/// Constructor of the expression a quantifier wraps its atom in.
type Quantify = fn(ExprId) -> Expression;

/// Builds a fresh [`Grammar`] from one meta-parse-tree.
///
/// Single use: [`visit_rules`](Self::visit_rules) consumes the visitor.
pub struct RuleVisitor {
    options: CompileOptions,
    graph: ExprGraph,
    lazy_references: Vec<ExprId>,
}

impl RuleVisitor {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            graph: ExprGraph::new(),
            lazy_references: Vec::new(),
        }
    }

    // rules = _ rule+
    pub fn visit_rules(mut self, node: &Node<'_>) -> Result<Grammar, CompileError> {
        expect_rule(node, "rules")?;
        let mut rules = RuleMap::default();
        for rule_node in child(node, 1)?.children() {
            let (name, expr) = self.visit_rule(rule_node)?;
            match rules.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(expr);
                }
                Entry::Occupied(mut entry) => match self.options.duplicate_rules {
                    DuplicateRules::Reject => {
                        return Err(CompileError::duplicate(entry.key().clone()));
                    }
                    DuplicateRules::LastWins => {
                        warn!("[VISITOR] rule `{}` redefined, keeping the later definition", entry.key());
                        entry.insert(expr);
                    }
                },
            }
        }

        self.resolve(&rules)?;
        Grammar::from_rules(self.graph, rules)
    }

    /// Patch every lazy reference with the rule it names.
    fn resolve(&mut self, rules: &RuleMap) -> Result<(), CompileError> {
        for &reference in &self.lazy_references {
            let target = {
                let lazy = self.graph[reference].as_lazy_reference().ok_or_else(|| {
                    CompileError::internal(format!("{reference} is not a lazy reference"))
                })?;
                *rules
                    .get(lazy.rule())
                    .ok_or_else(|| CompileError::unresolved(lazy.rule()))?
            };
            self.graph.patch(reference, target)?;
            trace!("[VISITOR] resolved {} -> {}", reference, target);
        }
        Ok(())
    }

    // rule = label equals expression
    fn visit_rule(&mut self, node: &Node<'_>) -> Result<(Name, ExprId), CompileError> {
        expect_rule(node, "rule")?;
        let label = self.visit_label(child(node, 0)?)?;
        let mut expr = self.visit_expression(child(node, 2)?)?;
        // `a = b`: the reference needs a parent slot to be patched into
        if self.graph[expr].kind() == ExprKind::LazyReference {
            expr = self.graph.add(Expression::sequence(vec![expr]));
        }
        self.graph.set_name(expr, label.clone());
        Ok((label, expr))
    }

    // label = ~"[a-zA-Z_][a-zA-Z_0-9]*" _
    fn visit_label(&self, node: &Node<'_>) -> Result<Name, CompileError> {
        expect_rule(node, "label")?;
        Ok(Name::new(child(node, 0)?.text()))
    }

    // expression = ored / sequence / term
    fn visit_expression(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "expression")?;
        let inner = child(node, 0)?;
        match inner.expr_name() {
            "ored" => self.visit_ored(inner),
            "sequence" => self.visit_sequence(inner),
            "term" => self.visit_term(inner),
            _ => Err(unexpected(node, inner)),
        }
    }

    // ored = (sequence / term) or_term+
    fn visit_ored(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "ored")?;
        let mut members = vec![self.visit_alternative(child(node, 0)?)?];
        for or_term in child(node, 1)?.children() {
            members.push(self.visit_or_term(or_term)?);
        }
        Ok(self.graph.add(Expression::one_of(members)))
    }

    // or_term = "/" _ (sequence / term)
    fn visit_or_term(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "or_term")?;
        self.visit_alternative(child(node, 2)?)
    }

    // (sequence / term)
    fn visit_alternative(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        if node.kind() != ExprKind::OneOf || !node.expr_name().is_empty() {
            return Err(CompileError::internal(format!(
                "expected alternative group, found `{}` ({})",
                node.expr_name(),
                node.kind()
            )));
        }
        let inner = child(node, 0)?;
        match inner.expr_name() {
            "sequence" => self.visit_sequence(inner),
            "term" => self.visit_term(inner),
            _ => Err(unexpected(node, inner)),
        }
    }

    // sequence = term term+
    fn visit_sequence(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "sequence")?;
        let mut members = vec![self.visit_term(child(node, 0)?)?];
        for term in child(node, 1)?.children() {
            members.push(self.visit_term(term)?);
        }
        Ok(self.graph.add(Expression::sequence(members)))
    }

    // term = not_term / lookahead_term / quantified / atom
    fn visit_term(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "term")?;
        let inner = child(node, 0)?;
        match inner.expr_name() {
            "not_term" => self.visit_not_term(inner),
            "lookahead_term" => self.visit_lookahead_term(inner),
            "quantified" => self.visit_quantified(inner),
            "atom" => self.visit_atom(inner),
            _ => Err(unexpected(node, inner)),
        }
    }

    // not_term = "!" term _
    fn visit_not_term(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "not_term")?;
        let term = self.visit_term(child(node, 1)?)?;
        Ok(self.graph.add(Expression::not(term)))
    }

    // lookahead_term = "&" term _
    fn visit_lookahead_term(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "lookahead_term")?;
        let term = self.visit_term(child(node, 1)?)?;
        Ok(self.graph.add(Expression::lookahead(term)))
    }

    // quantified = atom quantifier
    fn visit_quantified(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "quantified")?;
        let atom = self.visit_atom(child(node, 0)?)?;
        let quantify = self.visit_quantifier(child(node, 1)?)?;
        Ok(self.graph.add(quantify(atom)))
    }

    // quantifier = ~"[*+?]" _
    fn visit_quantifier(&self, node: &Node<'_>) -> Result<Quantify, CompileError> {
        expect_rule(node, "quantifier")?;
        let quantify: Quantify = match child(node, 0)?.text() {
            "?" => Expression::optional,
            "+" => Expression::one_or_more,
            "*" => Expression::zero_or_more,
            other => {
                return Err(CompileError::internal(format!("unknown quantifier {other:?}")));
            }
        };
        Ok(quantify)
    }

    // atom = reference / literal / regex / parenthesized
    fn visit_atom(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "atom")?;
        let inner = child(node, 0)?;
        match inner.expr_name() {
            "reference" => self.visit_reference(inner),
            "literal" => self.visit_literal(inner),
            "regex" => self.visit_regex(inner),
            "parenthesized" => self.visit_parenthesized(inner),
            _ => Err(unexpected(node, inner)),
        }
    }

    // parenthesized = "(" _ expression ")" _
    fn visit_parenthesized(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "parenthesized")?;
        self.visit_expression(child(node, 2)?)
    }

    // reference = label !equals
    fn visit_reference(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "reference")?;
        let label = self.visit_label(child(node, 0)?)?;
        let reference = self.graph.add(Expression::lazy_reference(label));
        self.lazy_references.push(reference);
        Ok(reference)
    }

    // literal = spaceless_literal _
    fn visit_literal(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "literal")?;
        let body = strip_quotes(child(node, 0)?.text())?;
        Ok(self.graph.add(Expression::literal(unescape_literal(body))))
    }

    // regex = "~" spaceless_literal ~"[ilmsuxa]*"i _
    fn visit_regex(&mut self, node: &Node<'_>) -> Result<ExprId, CompileError> {
        expect_rule(node, "regex")?;
        let body = strip_quotes(child(node, 1)?.text())?;
        let flags = child(node, 2)?.text();
        let expr = Expression::regex(&unescape_regex(body), flags)?;
        Ok(self.graph.add(expr))
    }
}

fn expect_rule(node: &Node<'_>, rule: &str) -> Result<(), CompileError> {
    if node.expr_name() == rule {
        Ok(())
    } else {
        Err(CompileError::internal(format!(
            "expected `{rule}` node, found `{}` ({})",
            node.expr_name(),
            node.kind()
        )))
    }
}

fn child<'n, 'a>(node: &'n Node<'a>, index: usize) -> Result<&'n Node<'a>, CompileError> {
    node.child(index).ok_or_else(|| {
        CompileError::internal(format!(
            "`{}` node has no child {index}",
            node.expr_name()
        ))
    })
}

fn unexpected(parent: &Node<'_>, found: &Node<'_>) -> CompileError {
    CompileError::internal(format!(
        "unexpected `{}` inside `{}`",
        found.expr_name(),
        parent.expr_name()
    ))
}

fn strip_quotes(quoted: &str) -> Result<&str, CompileError> {
    quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| CompileError::internal(format!("unquoted literal {quoted:?}")))
}

/// Decode a string literal body: `\"`, `\\`, `\n`, `\r`, `\t`.
/// Other escapes are kept as written.
fn unescape_literal(body: &str) -> String {
    unescape(body, |c| match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    })
}

/// Undo the grammar language's escaping of a regex body (`\"` and `\\`
/// only), leaving every other escape for the regex engine.
fn unescape_regex(body: &str) -> String {
    unescape(body, |c| matches!(c, '"' | '\\').then_some(c))
}

fn unescape(body: &str, decode: impl Fn(char) -> Option<char>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) => match decode(escaped) {
                Some(decoded) => out.push(decoded),
                None => {
                    out.push('\\');
                    out.push(escaped);
                }
            },
            None => out.push('\\'),
        }
    }
    out
}
