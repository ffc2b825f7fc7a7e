//! Pattern matching engine for finding tree structures.
//!
//! This module evaluates compiled patterns against single nodes and whole
//! trees. Search is a depth-first pre-order walk: a node that matches is
//! recorded and its subtree is not revisited, otherwise the walk continues
//! into each child node.

mod capture;
mod matching;
mod trace;

pub use capture::{Captured, MatchOutcome, Occurrence};
pub use trace::{Attempt, LogTracer, MatchTracer, NoopTracer, RecordingTracer};

use crate::node::{SyntaxNode, ValueRef};
use crate::pattern::Pattern;

use matching::Engine;

static NOOP: NoopTracer = NoopTracer;

/// Pattern matcher that finds occurrences in syntax trees.
pub struct Matcher<'p> {
    pattern: &'p Pattern,
    tracer: &'p dyn MatchTracer,
}

impl<'p> Matcher<'p> {
    /// Creates a new matcher for the given pattern.
    #[must_use]
    pub fn new(pattern: &'p Pattern) -> Self {
        Self {
            pattern,
            tracer: &NOOP,
        }
    }

    /// Routes every evaluation through `tracer`.
    #[must_use]
    pub fn with_tracer(mut self, tracer: &'p dyn MatchTracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Returns the pattern being matched.
    #[must_use]
    pub const fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    /// Matches the pattern against `node` alone.
    ///
    /// Patterns without captures yield [`MatchOutcome::Matched`]; patterns
    /// with captures yield [`MatchOutcome::Captures`], even when the list is
    /// empty.
    #[must_use]
    pub fn match_node<'a>(&self, node: &'a SyntaxNode) -> MatchOutcome<'a> {
        match Engine::new(self.tracer).match_root(self.pattern.root(), node) {
            None => MatchOutcome::NoMatch,
            Some(_) if !self.pattern.has_captures() => MatchOutcome::Matched,
            Some(captures) => MatchOutcome::Captures(captures),
        }
    }

    /// Finds all occurrences of the pattern beneath and including `root`.
    ///
    /// Occurrences are numbered from 1 in traversal order.
    #[must_use]
    pub fn search<'a>(&self, root: &'a SyntaxNode) -> Vec<Occurrence<'a>> {
        let mut found = Vec::new();
        self.search_from(root, &mut found);
        found
    }

    /// Finds the first occurrence in traversal order.
    #[must_use]
    pub fn find_first<'a>(&self, root: &'a SyntaxNode) -> Option<Occurrence<'a>> {
        let outcome = self.match_node(root);
        if outcome.is_match() {
            return Some(Occurrence::new(root, outcome, 1));
        }
        root.child_nodes().find_map(|child| self.find_first(child))
    }

    /// Collects capture payloads across every occurrence.
    ///
    /// An occurrence of a pattern without captures contributes the matched
    /// node itself. A single payload overall collapses to
    /// [`Captured::One`].
    #[must_use]
    pub fn capture<'a>(&self, root: &'a SyntaxNode) -> Captured<'a> {
        let payloads = self
            .search(root)
            .into_iter()
            .flat_map(|occurrence| match occurrence.outcome() {
                MatchOutcome::Captures(values) => values.clone(),
                MatchOutcome::Matched | MatchOutcome::NoMatch => {
                    vec![ValueRef::Node(occurrence.node())]
                }
            })
            .collect();
        Captured::from_payloads(payloads)
    }

    fn search_from<'a>(&self, node: &'a SyntaxNode, found: &mut Vec<Occurrence<'a>>) {
        let outcome = self.match_node(node);
        if outcome.is_match() {
            let index = found.len().saturating_add(1);
            found.push(Occurrence::new(node, outcome, index));
            return;
        }
        for child in node.child_nodes() {
            self.search_from(child, found);
        }
    }
}
