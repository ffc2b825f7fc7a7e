//! Tests for pattern compilation.

use rstest::rstest;

use super::*;

fn compile(source: &str) -> PatternNode {
    Pattern::compile(source)
        .unwrap_or_else(|err| panic!("compile {source}: {err}"))
        .root()
        .clone()
}

fn sym(name: &str) -> PatternNode {
    PatternNode::Literal(LiteralValue::Symbol(name.to_owned()))
}

#[test]
fn compiles_sequence_with_captures() {
    assert_eq!(
        compile("(send nil $_ ...)"),
        PatternNode::Sequence(vec![
            sym("send"),
            PatternNode::Literal(LiteralValue::Nil),
            PatternNode::Capture(Box::new(PatternNode::Wildcard)),
            PatternNode::AnyNonEmpty,
        ])
    );
}

#[test]
fn compiles_groups_by_bracket() {
    assert_eq!(
        compile("{int [float !0.0]}"),
        PatternNode::Union(vec![
            sym("int"),
            PatternNode::Intersection(vec![
                sym("float"),
                PatternNode::Negation(Box::new(PatternNode::Literal(LiteralValue::Float(0.0)))),
            ]),
        ])
    );
}

#[test]
fn compiles_prefix_markers() {
    assert_eq!(
        compile("(def ?^$(send ...) \\1)"),
        PatternNode::Sequence(vec![
            sym("def"),
            PatternNode::Optional(Box::new(PatternNode::AncestorSearch(Box::new(
                PatternNode::Capture(Box::new(PatternNode::Sequence(vec![
                    sym("send"),
                    PatternNode::AnyNonEmpty,
                ])))
            )))),
            PatternNode::Backreference(1),
        ])
    );
}

#[rstest]
#[case("!")]
#[case("(send _ !)")]
fn bare_bang_is_literal_operator(#[case] source: &str) {
    let root = compile(source);
    let bang = match &root {
        PatternNode::Sequence(members) => members.last().cloned(),
        other => Some(other.clone()),
    };
    assert_eq!(bang, Some(sym("!")));
}

#[test]
fn colon_symbol_never_means_nil() {
    assert_eq!(compile(":nil"), sym("nil"));
    assert_eq!(compile("nil"), PatternNode::Literal(LiteralValue::Nil));
}

#[test]
fn arguments_bind_values_at_compile_time() {
    let pattern = Pattern::compile_with_args("(lit %1)", &[Value::int(7)]).expect("compile");
    assert_eq!(
        pattern.root(),
        &PatternNode::Sequence(vec![
            sym("lit"),
            PatternNode::Literal(LiteralValue::Value(Value::int(7))),
        ])
    );
}

#[test]
fn capture_count_is_static() {
    let pattern = Pattern::compile("(send $_ {$int !$str})").expect("compile");
    assert_eq!(pattern.capture_count(), 3);
    assert!(pattern.has_captures());
    assert!(!Pattern::compile("(send _)").expect("compile").has_captures());
}

#[rstest]
#[case("(send $_ ...)")]
#[case("{int float}")]
#[case("[!nil ^(lit 1)]")]
#[case("(str \"a\\\"b\")")]
#[case("(begin (lvasgn _ $(...)) (lvasgn _ \\1))")]
fn display_round_trips(#[case] source: &str) {
    let pattern = Pattern::compile(source).expect("compile");
    assert_eq!(pattern.root().to_string(), source);
    assert_eq!(Pattern::from_node(pattern.root().clone()).source(), source);
}

#[rstest]
#[case("nil")]
#[case("_")]
#[case("1st")]
fn keyword_like_symbols_keep_their_colon(#[case] name: &str) {
    let built = Pattern::from_node(PatternNode::Sequence(vec![sym("send"), sym(name)]));
    assert_eq!(built.source(), format!("(send :{name})"));
    let reparsed = Pattern::compile(built.source()).expect("compile");
    assert_eq!(reparsed.root(), built.root());
}

#[rstest]
#[case("", 0)]
#[case("   ", 0)]
#[case("$", 0)]
#[case("(send $)", 6)]
#[case("?", 0)]
#[case("^", 0)]
#[case("\\", 0)]
#[case("\\foo", 0)]
#[case("\\0", 0)]
#[case(")", 0)]
#[case("(int]", 4)]
#[case("int float", 4)]
#[case("(lit %1)", 5)]
fn rejects_malformed_patterns(#[case] source: &str, #[case] offset: usize) {
    let err = Pattern::compile(source).expect_err("should fail");
    assert!(
        matches!(err, SyntaxError::MalformedPattern { .. }),
        "{source}: {err}"
    );
    assert_eq!(err.offset(), Some(offset), "{source}: {err}");
}

#[rstest]
#[case("(send _", '(', 0)]
#[case("(a {b [c]", '{', 3)]
#[case("[", '[', 0)]
fn unterminated_groups_are_errors(
    #[case] source: &str,
    #[case] opener: char,
    #[case] offset: usize,
) {
    let err = Pattern::compile(source).expect_err("should fail");
    assert_eq!(err, SyntaxError::unterminated(opener, offset));
}
