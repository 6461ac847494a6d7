//! Bootstrap grammar for the grammar-description language.
//!
//! [`hand_built`] assembles, without the compiler, just enough of the
//! language to read [`RULE_SYNTAX`]: everything except `&`, which the
//! self-description never uses. [`bootstrap`] parses [`RULE_SYNTAX`]
//! with it and compiles the result into the full meta grammar.
//!
//! Both graphs must agree: parsing [`RULE_SYNTAX`] with either yields equal
//! trees.

use super::{CompileOptions, Grammar};
use crate::base::{ExprId, Name};
use crate::error::CompileError;
use crate::expr::{ExprGraph, Expression};

/// The grammar-description language, written in itself.
pub const RULE_SYNTAX: &str = r##"
# `_` soaks up whitespace and comments after leaf-level tokens;
# literals such as "/" count as leaves.

rules = _ rule+
rule = label equals expression
equals = "=" _
literal = spaceless_literal _

# Flags follow the closing quote directly, `~"..." ilm` is not a regex:
spaceless_literal = ~"\"[^\"\\\\]*(?:\\\\.[^\"\\\\]*)*\""is

expression = ored / sequence / term
or_term = "/" _ (sequence / term)
ored = (sequence / term) or_term+
sequence = term term+
not_term = "!" term _
lookahead_term = "&" term _
term = not_term / lookahead_term / quantified / atom
quantified = atom quantifier
atom = reference / literal / regex / parenthesized
regex = "~" spaceless_literal ~"[ilmsuxa]*"i _
parenthesized = "(" _ expression ")" _
quantifier = ~"[*+?]" _
reference = label !equals

# Only a following `=` tells a label (which starts a new rule) apart from
# a reference to a rule defined elsewhere:
label = ~"[a-zA-Z_][a-zA-Z_0-9]*" _

_ = meaninglessness*
meaninglessness = ~"\s+" / comment
comment = ~"#[^\r\n]*"
"##;

/// Hand-assembled graph and its named rules.
#[derive(Default)]
struct Assembler {
    graph: ExprGraph,
    rules: Vec<(Name, ExprId)>,
}

impl Assembler {
    fn rule(&mut self, name: &str, expr: Expression) -> ExprId {
        let id = self.graph.add(expr.named(name));
        self.rules.push((Name::new(name), id));
        id
    }

    fn inline(&mut self, expr: Expression) -> ExprId {
        self.graph.add(expr)
    }

    fn finish(self) -> Result<Grammar, CompileError> {
        Grammar::from_rules(self.graph, self.rules)
    }
}

/// Build the meta grammar by hand, with no help from the compiler.
pub fn hand_built() -> Result<Grammar, CompileError> {
    let mut g = Assembler::default();

    let comment = g.rule("comment", Expression::regex(r"#[^\r\n]*", "")?);
    let whitespace = g.inline(Expression::regex(r"\s+", "")?);
    let meaninglessness = g.rule("meaninglessness", Expression::one_of(vec![whitespace, comment]));
    let ignorable = g.rule("_", Expression::zero_or_more(meaninglessness));

    let eq = g.inline(Expression::literal("="));
    let equals = g.rule("equals", Expression::sequence(vec![eq, ignorable]));
    let identifier = g.inline(Expression::regex("[a-zA-Z_][a-zA-Z_0-9]*", "")?);
    let label = g.rule("label", Expression::sequence(vec![identifier, ignorable]));
    let not_equals = g.inline(Expression::not(equals));
    let reference = g.rule("reference", Expression::sequence(vec![label, not_equals]));

    let quantifier_char = g.inline(Expression::regex("[*+?]", "")?);
    let quantifier = g.rule("quantifier", Expression::sequence(vec![quantifier_char, ignorable]));

    // admits the empty literal `""`
    let spaceless_literal = g.rule(
        "spaceless_literal",
        Expression::regex(r#""[^"\\]*(?:\\.[^"\\]*)*""#, "")?,
    );
    let literal = g.rule("literal", Expression::sequence(vec![spaceless_literal, ignorable]));
    let tilde = g.inline(Expression::literal("~"));
    let flags = g.inline(Expression::regex("[ilmsuxa]*", "")?);
    let regex = g.rule(
        "regex",
        Expression::sequence(vec![tilde, spaceless_literal, flags, ignorable]),
    );

    let atom = g.rule("atom", Expression::one_of(vec![reference, literal, regex]));
    let quantified = g.rule("quantified", Expression::sequence(vec![atom, quantifier]));

    // not_term refers back to term, so term is completed once not_term exists
    let term = g.rule("term", Expression::one_of(vec![quantified, atom]));
    let bang = g.inline(Expression::literal("!"));
    let not_term = g.rule("not_term", Expression::sequence(vec![bang, term, ignorable]));
    g.graph.insert_member(term, 0, not_term)?;

    let more_terms = g.inline(Expression::one_or_more(term));
    let sequence = g.rule("sequence", Expression::sequence(vec![term, more_terms]));
    let slash = g.inline(Expression::literal("/"));
    let alternative = g.inline(Expression::one_of(vec![sequence, term]));
    let or_term = g.rule("or_term", Expression::sequence(vec![slash, ignorable, alternative]));
    let more_or_terms = g.inline(Expression::one_or_more(or_term));
    let ored = g.rule("ored", Expression::sequence(vec![alternative, more_or_terms]));
    let expression = g.rule("expression", Expression::one_of(vec![ored, sequence, term]));

    // grouping closes the loop from atom back to expression
    let open = g.inline(Expression::literal("("));
    let close = g.inline(Expression::literal(")"));
    let parenthesized = g.rule(
        "parenthesized",
        Expression::sequence(vec![open, ignorable, expression, close, ignorable]),
    );
    g.graph.insert_member(atom, 3, parenthesized)?;

    let rule = g.rule("rule", Expression::sequence(vec![label, equals, expression]));
    let all_rules = g.inline(Expression::one_or_more(rule));
    g.rule("rules", Expression::sequence(vec![ignorable, all_rules]));

    g.finish()
}

/// Compile the full meta grammar from [`RULE_SYNTAX`] via [`hand_built`].
pub fn bootstrap() -> Result<Grammar, CompileError> {
    hand_built()?.compile_definition(RULE_SYNTAX, &CompileOptions::default())
}
