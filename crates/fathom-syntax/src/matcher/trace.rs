//! Instrumentation hooks for the recursive matcher.
//!
//! A [`MatchTracer`] is handed to the matcher for the duration of one call.
//! Every pattern element visited produces an `enter` event before evaluation
//! and an `exit` event carrying the result.

use std::cell::{Cell, RefCell};

use tracing::trace;

use crate::node::ValueRef;
use crate::pattern::PatternNode;

const MATCHER_TARGET: &str = "fathom_syntax::matcher";

/// Receives events from the recursive matcher.
pub trait MatchTracer {
    /// Called before `pattern` is evaluated against `target`.
    fn enter(&self, _pattern: &PatternNode, _target: Option<ValueRef<'_>>, _depth: usize) {}

    /// Called after `pattern` was evaluated against `target`.
    fn exit(
        &self,
        _pattern: &PatternNode,
        _target: Option<ValueRef<'_>>,
        _depth: usize,
        _matched: bool,
    ) {
    }
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl MatchTracer for NoopTracer {}

/// Emits each evaluation result as a `TRACE` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl MatchTracer for LogTracer {
    fn exit(&self, pattern: &PatternNode, target: Option<ValueRef<'_>>, depth: usize, matched: bool) {
        trace!(
            target: MATCHER_TARGET,
            depth,
            pattern = %pattern,
            node = %target.map_or_else(|| "<absent>".to_owned(), |value| value.to_string()),
            matched,
            "pattern evaluated"
        );
    }
}

/// One top-level match attempt seen by a [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Tag of the node the attempt ran against.
    pub tag: String,
    /// Whether the attempt succeeded.
    pub matched: bool,
}

/// Records every top-level match attempt.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    attempts: RefCell<Vec<Attempt>>,
    evaluations: Cell<usize>,
}

impl RecordingTracer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the top-level attempts in the order they ran.
    #[must_use]
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.borrow().clone()
    }

    /// Returns the tags of nodes a top-level attempt ran against.
    #[must_use]
    pub fn attempted_tags(&self) -> Vec<String> {
        self.attempts
            .borrow()
            .iter()
            .map(|attempt| attempt.tag.clone())
            .collect()
    }

    /// Returns how many pattern elements were evaluated in total.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}

impl MatchTracer for RecordingTracer {
    fn enter(&self, _pattern: &PatternNode, _target: Option<ValueRef<'_>>, _depth: usize) {
        self.evaluations.set(self.evaluations.get().saturating_add(1));
    }

    fn exit(&self, _pattern: &PatternNode, target: Option<ValueRef<'_>>, depth: usize, matched: bool) {
        if depth != 0 {
            return;
        }
        let tag = target
            .and_then(ValueRef::as_node)
            .map_or_else(String::new, |node| node.tag().to_owned());
        self.attempts.borrow_mut().push(Attempt { tag, matched });
    }
}
