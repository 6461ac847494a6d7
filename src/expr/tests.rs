//! Matching semantics of each combinator, exercised on hand-built graphs.

use super::*;
use rstest::rstest;

fn regex(graph: &mut ExprGraph, pattern: &str) -> ExprId {
    graph.add(Expression::regex(pattern, "").unwrap())
}

#[test]
fn test_literal_consumes_exact_length() {
    let mut graph = ExprGraph::new();
    let hello = graph.add(Expression::literal("hello"));

    let node = graph.match_at(hello, "hello world", 0).unwrap();
    assert_eq!(node.text(), "hello");
    assert_eq!(node.kind(), ExprKind::Literal);
    assert!(node.children().is_empty());

    assert!(graph.match_at(hello, "say hello", 0).is_none());
    assert_eq!(graph.match_at(hello, "say hello", 4).unwrap().end(), 9);
}

#[test]
fn test_regex_never_searches_ahead() {
    let mut graph = ExprGraph::new();
    let digits = regex(&mut graph, "[0-9]+");

    assert!(graph.match_at(digits, "ab12", 0).is_none());
    let node = graph.match_at(digits, "ab12", 2).unwrap();
    assert_eq!((node.start(), node.end()), (2, 4));
}

#[test]
fn test_sequence_spans_members_and_fails_as_a_whole() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let b = graph.add(Expression::literal("b"));
    let seq = graph.add(Expression::sequence(vec![a, b]));

    let node = graph.match_at(seq, "abc", 0).unwrap();
    assert_eq!(node.text(), "ab");
    assert_eq!(node.children().len(), 2);
    assert_eq!(node.child(1).unwrap().start(), 1);

    assert!(graph.match_at(seq, "ac", 0).is_none());
}

#[test]
fn test_one_of_is_ordered_not_longest() {
    let mut graph = ExprGraph::new();
    let short = graph.add(Expression::literal("a").named("short"));
    let long = graph.add(Expression::literal("ab").named("long"));
    let choice = graph.add(Expression::one_of(vec![short, long]));

    let node = graph.match_at(choice, "ab", 0).unwrap();
    assert_eq!(node.text(), "a");
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.child(0).unwrap().expr_name(), "short");
}

#[test]
fn test_one_of_falls_through_to_later_member() {
    let mut graph = ExprGraph::new();
    let x = graph.add(Expression::literal("x"));
    let y = graph.add(Expression::literal("y").named("y"));
    let choice = graph.add(Expression::one_of(vec![x, y]));

    assert_eq!(graph.match_at(choice, "y", 0).unwrap().child(0).unwrap().expr_name(), "y");
    assert!(graph.match_at(choice, "z", 0).is_none());
}

#[test]
fn test_optional_never_fails() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let opt = graph.add(Expression::optional(a));

    let hit = graph.match_at(opt, "a", 0).unwrap();
    assert_eq!(hit.children().len(), 1);
    assert_eq!(hit.text(), "a");

    let miss = graph.match_at(opt, "b", 0).unwrap();
    assert!(miss.is_empty());
    assert!(miss.children().is_empty());
}

#[test]
fn test_zero_or_more_collects_every_repetition() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let many = graph.add(Expression::zero_or_more(a));

    let node = graph.match_at(many, "aaab", 0).unwrap();
    assert_eq!(node.text(), "aaa");
    assert_eq!(node.children().len(), 3);

    let none = graph.match_at(many, "b", 0).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_one_or_more_requires_min() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let plus = graph.add(Expression::one_or_more(a));
    let at_least_two = graph.add(Expression::repeated(a, 2));

    assert!(graph.match_at(plus, "b", 0).is_none());
    assert_eq!(graph.match_at(plus, "ab", 0).unwrap().children().len(), 1);
    assert!(graph.match_at(at_least_two, "ab", 0).is_none());
    assert_eq!(graph.match_at(at_least_two, "aab", 0).unwrap().text(), "aa");
    assert_eq!(graph.match_at(at_least_two, "aab", 0).unwrap().kind(), ExprKind::OneOrMore);
}

#[test]
fn test_zero_width_repetition_terminates() {
    let mut graph = ExprGraph::new();
    let anything = regex(&mut graph, ".*");
    let many = graph.add(Expression::zero_or_more(anything));
    let plus = graph.add(Expression::one_or_more(anything));

    let node = graph.match_at(many, "abc", 0).unwrap();
    assert_eq!(node.text(), "abc");
    assert_eq!(node.children().len(), 1);

    let at_end = graph.match_at(many, "abc", 3).unwrap();
    assert!(at_end.is_empty());
    assert!(at_end.children().is_empty());

    // the zero-width match does not count towards the minimum
    assert!(graph.match_at(plus, "abc", 3).is_none());
}

#[rstest]
#[case::optional(Expression::optional)]
#[case::zero_or_more(Expression::zero_or_more)]
fn test_quantifier_at_end_of_input(#[case] quantify: fn(ExprId) -> Expression) {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let quantified = graph.add(quantify(a));

    let node = graph.match_at(quantified, "aa", 2).unwrap();
    assert_eq!((node.start(), node.end()), (2, 2));
    assert!(node.children().is_empty());

    assert!(graph.match_at(quantified, "", 0).unwrap().is_empty());
}

#[test]
fn test_lookahead_does_not_consume() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let peek = graph.add(Expression::lookahead(a));

    let node = graph.match_at(peek, "abc", 0).unwrap();
    assert!(node.is_empty());
    assert!(node.children().is_empty());
    assert!(graph.match_at(peek, "bc", 0).is_none());
}

#[test]
fn test_not_inverts_member() {
    let mut graph = ExprGraph::new();
    let eq = graph.add(Expression::literal("="));
    let not_eq = graph.add(Expression::not(eq));

    assert!(graph.match_at(not_eq, "=", 0).is_none());
    let node = graph.match_at(not_eq, "x", 0).unwrap();
    assert!(node.is_empty());
    assert_eq!(node.kind(), ExprKind::Not);
}

#[test]
fn test_match_at_rejects_non_boundary_positions() {
    let mut graph = ExprGraph::new();
    let any = regex(&mut graph, ".");

    assert!(graph.match_at(any, "é", 1).is_none());
    assert!(graph.match_at(any, "é", 5).is_none());
    assert_eq!(graph.match_at(any, "é", 0).unwrap().text(), "é");
}

#[test]
fn test_add_links_lazy_reference_slots() {
    let mut graph = ExprGraph::new();
    let a = graph.add(Expression::literal("a"));
    let lazy = graph.add(Expression::lazy_reference("b"));
    let seq = graph.add(Expression::sequence(vec![a, lazy]));

    let slot = graph[lazy].as_lazy_reference().unwrap().slot();
    assert_eq!(slot, Some(Slot { parent: seq, index: 1 }));
    assert_eq!(graph.unresolved().map(LazyReference::rule), Some("b"));
}

#[test]
fn test_patch_replaces_slot_with_target() {
    let mut graph = ExprGraph::new();
    let lazy = graph.add(Expression::lazy_reference("x"));
    let star = graph.add(Expression::zero_or_more(lazy));
    let x = graph.add(Expression::literal("x").named("x"));

    graph.patch(lazy, x).unwrap();
    assert_eq!(graph[star].members(), &[x]);
    assert!(graph.unresolved().is_none());
    assert_eq!(graph.match_at(star, "xxy", 0).unwrap().text(), "xx");

    // a second patch finds the slot already taken
    assert!(graph.patch(lazy, x).unwrap_err().is_internal());
}

#[test]
fn test_patch_requires_parent_slot() {
    let mut graph = ExprGraph::new();
    let orphan = graph.add(Expression::lazy_reference("x"));
    let target = graph.add(Expression::literal("x"));

    assert!(graph.patch(orphan, target).unwrap_err().is_internal());
}

#[test]
fn test_insert_member_relinks_shifted_references() {
    let mut graph = ExprGraph::new();
    let lazy = graph.add(Expression::lazy_reference("r"));
    let choice = graph.add(Expression::one_of(vec![lazy]));
    let first = graph.add(Expression::literal("f"));

    graph.insert_member(choice, 0, first).unwrap();
    assert_eq!(graph[choice].members(), &[first, lazy]);
    assert_eq!(
        graph[lazy].as_lazy_reference().unwrap().slot(),
        Some(Slot { parent: choice, index: 1 })
    );
}

#[test]
fn test_insert_member_rejects_leaves() {
    let mut graph = ExprGraph::new();
    let leaf = graph.add(Expression::literal("a"));
    let other = graph.add(Expression::literal("b"));

    assert!(graph.insert_member(leaf, 0, other).unwrap_err().is_internal());
}

#[test]
fn test_self_recursive_graph_matches() {
    // a = "(" a ")" / "0"
    let mut graph = ExprGraph::new();
    let open = graph.add(Expression::literal("("));
    let lazy = graph.add(Expression::lazy_reference("a"));
    let close = graph.add(Expression::literal(")"));
    let nested = graph.add(Expression::sequence(vec![open, lazy, close]));
    let zero = graph.add(Expression::literal("0"));
    let a = graph.add(Expression::one_of(vec![nested, zero]).named("a"));
    graph.patch(lazy, a).unwrap();

    let node = graph.match_at(a, "((0))", 0).unwrap();
    assert_eq!(node.len(), 5);
    assert!(graph.match_at(a, "((0)", 0).is_none());
}

#[test]
fn test_kind_classification() {
    assert!(ExprKind::Sequence.is_compound());
    assert!(ExprKind::OneOf.is_compound());
    assert!(ExprKind::Not.is_unary());
    assert!(!ExprKind::Literal.is_unary());
    assert_eq!(ExprKind::ZeroOrMore.to_string(), "zero_or_more");
}
