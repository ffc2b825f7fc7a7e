//! Core recursive matching.
//!
//! Captures accumulate into one list per top-level attempt. Every branch
//! point evaluates on a trial copy of that list and writes it back only on
//! success, so failed alternatives never leak captures.

use std::cmp::Ordering;

use crate::node::{Scalar, SyntaxNode, Value, ValueRef};
use crate::pattern::{LiteralValue, PatternNode};

use super::trace::MatchTracer;

/// A match target; `None` is a child position past the end of a node.
pub(super) type Target<'a> = Option<ValueRef<'a>>;

pub(super) struct Engine<'t> {
    tracer: &'t dyn MatchTracer,
}

impl<'t> Engine<'t> {
    pub(super) const fn new(tracer: &'t dyn MatchTracer) -> Self {
        Self { tracer }
    }

    /// Evaluates `pattern` against a node as a top-level attempt.
    pub(super) fn match_root<'a>(
        &self,
        pattern: &PatternNode,
        node: &'a SyntaxNode,
    ) -> Option<Vec<ValueRef<'a>>> {
        let mut captures = Vec::new();
        self.matches(pattern, Some(ValueRef::Node(node)), &mut captures, 0)
            .then_some(captures)
    }

    fn matches<'a>(
        &self,
        pattern: &PatternNode,
        target: Target<'a>,
        captures: &mut Vec<ValueRef<'a>>,
        depth: usize,
    ) -> bool {
        self.tracer.enter(pattern, target, depth);
        let matched = self.evaluate(pattern, target, captures, depth);
        self.tracer.exit(pattern, target, depth, matched);
        matched
    }

    fn evaluate<'a>(
        &self,
        pattern: &PatternNode,
        target: Target<'a>,
        captures: &mut Vec<ValueRef<'a>>,
        depth: usize,
    ) -> bool {
        let inner_depth = depth.saturating_add(1);
        match pattern {
            PatternNode::Wildcard => !is_absent(target),
            PatternNode::AnyNonEmpty => target
                .and_then(ValueRef::as_node)
                .is_some_and(|node| !node.children().is_empty()),
            PatternNode::Literal(literal) => literal_matches(literal, target),
            PatternNode::Sequence(members) => {
                self.match_sequence(members, target, captures, inner_depth)
            }
            PatternNode::Capture(inner) => self.match_capture(inner, target, captures, inner_depth),
            PatternNode::Union(members) => members.iter().any(|member| {
                commit_if(captures, |trial| {
                    self.matches(member, target, trial, inner_depth)
                })
            }),
            PatternNode::Intersection(members) => commit_if(captures, |trial| {
                members
                    .iter()
                    .all(|member| self.matches(member, target, trial, inner_depth))
            }),
            PatternNode::Negation(inner) => {
                let mut scratch = captures.clone();
                !self.matches(inner, target, &mut scratch, inner_depth)
            }
            PatternNode::Optional(inner) => {
                is_absent(target)
                    || commit_if(captures, |trial| {
                        self.matches(inner, target, trial, inner_depth)
                    })
            }
            PatternNode::AncestorSearch(inner) => {
                let Some(node) = target.and_then(ValueRef::as_node) else {
                    return false;
                };
                node.child_nodes().any(|child| {
                    commit_if(captures, |trial| {
                        self.matches(inner, Some(ValueRef::Node(child)), trial, inner_depth)
                    })
                })
            }
            PatternNode::Backreference(number) => number
                .checked_sub(1)
                .and_then(|slot| captures.get(slot))
                .is_some_and(|captured| target == Some(*captured)),
        }
    }

    fn match_sequence<'a>(
        &self,
        members: &[PatternNode],
        target: Target<'a>,
        captures: &mut Vec<ValueRef<'a>>,
        depth: usize,
    ) -> bool {
        let Some(node) = target.and_then(ValueRef::as_node) else {
            return false;
        };
        let Some((head, rest)) = members.split_first() else {
            return true;
        };
        commit_if(captures, |trial| {
            self.matches(head, target, trial, depth)
                && rest.iter().enumerate().all(|(position, member)| {
                    let child = node.child(position).map(Value::as_value_ref);
                    match member {
                        // Inside a sequence `...` only asks for one more child.
                        PatternNode::AnyNonEmpty => child.is_some(),
                        _ => self.matches(member, child, trial, depth),
                    }
                })
        })
    }

    /// Records the capture ahead of anything its inner pattern captured.
    fn match_capture<'a>(
        &self,
        inner: &PatternNode,
        target: Target<'a>,
        captures: &mut Vec<ValueRef<'a>>,
        depth: usize,
    ) -> bool {
        let base = captures.len();
        let mut trial = captures.clone();
        if !self.matches(inner, target, &mut trial, depth) {
            return false;
        }
        let nested = trial.split_off(base);
        if let Some(value) = target {
            captures.push(value);
        }
        captures.extend(nested);
        true
    }
}

/// Runs `attempt` on a copy of `captures`, keeping the copy on success.
fn commit_if<'a>(
    captures: &mut Vec<ValueRef<'a>>,
    attempt: impl FnOnce(&mut Vec<ValueRef<'a>>) -> bool,
) -> bool {
    let mut trial = captures.clone();
    let matched = attempt(&mut trial);
    if matched {
        *captures = trial;
    }
    matched
}

/// Absent means a missing child position or a `nil` leaf.
pub(super) fn is_absent(target: Target<'_>) -> bool {
    match target {
        None => true,
        Some(ValueRef::Leaf(leaf)) => leaf.is_nil(),
        Some(ValueRef::Node(_)) => false,
    }
}

fn literal_matches(literal: &LiteralValue, target: Target<'_>) -> bool {
    match (literal, target) {
        (LiteralValue::Nil, _) => is_absent(target),
        (_, None) => false,
        (LiteralValue::Value(expected), Some(actual)) => actual == expected.as_value_ref(),
        (LiteralValue::Symbol(name), Some(ValueRef::Node(node))) => node.tag() == name,
        (_, Some(ValueRef::Node(_))) => false,
        (_, Some(ValueRef::Leaf(leaf))) => scalar_matches(literal, leaf.scalar()),
    }
}

fn scalar_matches(literal: &LiteralValue, scalar: &Scalar) -> bool {
    match (literal, scalar) {
        (LiteralValue::Symbol(name), Scalar::Sym(text) | Scalar::Str(text))
        | (LiteralValue::Str(name), Scalar::Str(text)) => name == text,
        (LiteralValue::Int(expected), Scalar::Int(actual)) => expected == actual,
        (LiteralValue::Float(expected), Scalar::Float(actual)) => {
            expected.total_cmp(actual) == Ordering::Equal
        }
        _ => false,
    }
}
