//! Unit tests for fathom-syntax.

use rstest::{fixture, rstest};

use crate::{
    Captured, MatchOutcome, Matcher, Pattern, PatternNode, RewriteRule, SyntaxNode, position, sexp,
};

#[fixture]
fn program() -> (String, SyntaxNode) {
    let source = "(begin\n  (lvasgn a (int 1))\n  (send nil :puts (lvar a))\n  (lvasgn b (send (int 2) :+ (int 3))))";
    let tree = sexp::parse(source).unwrap_or_else(|err| panic!("parse: {err}"));
    (source.to_owned(), tree)
}

// =============================================================================
// Match Outcome Tests
// =============================================================================

#[rstest]
#[case("(lvasgn _ _)", 0)]
#[case("(lvasgn $_ _)", 1)]
#[case("(lvasgn $_ $(int $_))", 3)]
#[case("$(lvasgn _ [$(...) !nil])", 2)]
fn captures_match_static_count(
    program: (String, SyntaxNode),
    #[case] pattern: &str,
    #[case] count: usize,
) {
    let (_, tree) = program;
    let compiled = Pattern::compile(pattern).unwrap_or_else(|err| panic!("compile: {err}"));
    let occurrences = compiled.search(&tree);
    let Some(first) = occurrences.first() else {
        panic!("expected an occurrence of {pattern}");
    };
    match first.outcome() {
        MatchOutcome::Matched => assert_eq!(count, 0),
        MatchOutcome::Captures(values) => assert_eq!(values.len(), count),
        MatchOutcome::NoMatch => panic!("search yielded a non-match"),
    }
}

#[rstest]
#[case("(int _)")]
#[case("{lvar int}")]
#[case("(send _ _ ...)")]
#[case("^(int $_)")]
#[case("[!(int 1) (int _)]")]
fn every_occurrence_rematches_its_node(program: (String, SyntaxNode), #[case] pattern: &str) {
    let (_, tree) = program;
    let compiled = Pattern::compile(pattern).unwrap_or_else(|err| panic!("compile: {err}"));
    let occurrences = compiled.search(&tree);
    assert!(!occurrences.is_empty(), "{pattern}");
    for occurrence in &occurrences {
        assert!(compiled.match_node(occurrence.node()).is_match());
    }
}

#[rstest]
#[case("(int _)")]
#[case("(send nil _ ...)")]
#[case("{lvar (int 2)}")]
fn negation_is_the_complement(program: (String, SyntaxNode), #[case] pattern: &str) {
    let (_, tree) = program;
    let positive = Pattern::compile(pattern).unwrap_or_else(|err| panic!("compile: {err}"));
    let negative =
        Pattern::compile(&format!("!{pattern}")).unwrap_or_else(|err| panic!("compile: {err}"));
    let mut stack = vec![&tree];
    while let Some(node) = stack.pop() {
        assert_ne!(
            positive.match_node(node).is_match(),
            negative.match_node(node).is_match(),
            "{node}"
        );
        stack.extend(node.child_nodes());
    }
}

// =============================================================================
// Capture Collection Tests
// =============================================================================

#[rstest]
fn capture_collapses_a_single_payload(program: (String, SyntaxNode)) {
    let (source, tree) = program;
    let compiled = Pattern::compile("(send nil puts $_)").unwrap_or_else(|err| panic!("{err}"));
    let Captured::One(value) = compiled.capture(&tree) else {
        panic!("expected a single payload");
    };
    assert_eq!(value.source_text(&source), "(lvar a)");
}

#[rstest]
fn capture_without_markers_yields_nodes(program: (String, SyntaxNode)) {
    let (_, tree) = program;
    let compiled = Pattern::compile("lvasgn").unwrap_or_else(|err| panic!("{err}"));
    let values = compiled.capture(&tree).into_vec();
    let tags: Vec<_> = values
        .iter()
        .filter_map(|value| value.as_node().map(SyntaxNode::tag))
        .collect();
    assert_eq!(tags, vec!["lvasgn", "lvasgn"]);
}

#[test]
fn compiled_patterns_can_be_built_directly() {
    let compiled = Pattern::from_node(PatternNode::Capture(Box::new(PatternNode::Wildcard)));
    assert_eq!(compiled.capture_count(), 1);
    let tree = sexp::parse("(int 1)").unwrap_or_else(|err| panic!("{err}"));
    assert!(Matcher::new(&compiled).match_node(&tree).is_match());
}

// =============================================================================
// Positions
// =============================================================================

#[rstest]
fn occurrences_map_to_line_and_column(program: (String, SyntaxNode)) {
    let (source, tree) = program;
    let compiled = Pattern::compile("(send nil _ _)").unwrap_or_else(|err| panic!("{err}"));
    let Some(occurrence) = compiled.search(&tree).into_iter().next() else {
        panic!("expected an occurrence");
    };
    let Some(span) = occurrence.node().span() else {
        panic!("parsed nodes carry spans");
    };
    assert_eq!(position::line_col(&source, span.start()), (3, 3));
}

// =============================================================================
// Rewriting
// =============================================================================

#[rstest]
fn rewrite_preserves_surrounding_layout(program: (String, SyntaxNode)) {
    let (source, tree) = program;
    let compiled = Pattern::compile("(lvar $_)").unwrap_or_else(|err| panic!("{err}"));
    let rule = RewriteRule::new(compiled, "(ivar :@$1)").unwrap_or_else(|err| panic!("{err}"));
    let result = rule
        .apply(&tree, &source)
        .unwrap_or_else(|err| panic!("rewrite: {err}"));
    assert_eq!(
        result.output(),
        "(begin\n  (lvasgn a (int 1))\n  (send nil :puts (ivar :@a))\n  (lvasgn b (send (int 2) :+ (int 3))))"
    );
}
