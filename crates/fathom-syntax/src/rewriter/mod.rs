//! Structural rewrite engine.
//!
//! A rewrite pass walks the tree once, tests nodes admitted by the pattern's
//! [`TagDispatch`], and hands each occurrence to an edit callback together
//! with an [`EditSession`]. Occurrences are numbered from 1 in traversal
//! order; the counter advances immediately before each callback, so a
//! callback can act on one numbered occurrence only. The edits collected
//! across the pass form a [`RewritePlan`] applied to the original buffer.

mod dispatch;
mod edit;
mod rule;

pub use dispatch::TagDispatch;
pub use edit::{RewritePlan, TextEdit};
pub use rule::RewriteRule;

use crate::error::SyntaxError;
use crate::matcher::{MatchTracer, Matcher, Occurrence};
use crate::node::{Span, SyntaxNode};
use crate::pattern::Pattern;

/// Edit primitives available to a rewrite callback.
///
/// Offsets and spans refer to the original source buffer.
pub struct EditSession<'s> {
    plan: &'s mut RewritePlan,
    source: &'s str,
    match_index: usize,
}

impl<'s> EditSession<'s> {
    /// Replaces the text covered by `span`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.plan.push(TextEdit::replace(span, text));
    }

    /// Deletes the text covered by `span`.
    pub fn remove(&mut self, span: Span) {
        self.plan.push(TextEdit::remove(span));
    }

    /// Inserts text at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.plan.push(TextEdit::insert_at(offset, text));
    }

    /// Returns the 1-based number of the current occurrence.
    #[must_use]
    pub const fn match_index(&self) -> usize {
        self.match_index
    }

    /// Returns the original source buffer.
    #[must_use]
    pub const fn source(&self) -> &'s str {
        self.source
    }
}

/// Result of a rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    output: String,
    occurrences: usize,
    edits: usize,
}

impl RewriteResult {
    /// Returns the patched source text.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the patched text.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns how many occurrences the pass visited.
    #[must_use]
    pub const fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Returns how many edits were applied.
    #[must_use]
    pub const fn edits(&self) -> usize {
        self.edits
    }

    /// Returns whether any edit was applied.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.edits > 0
    }
}

/// Engine for applying callback-driven rewrites of one pattern.
pub struct Rewriter<'p> {
    matcher: Matcher<'p>,
    dispatch: TagDispatch,
}

impl<'p> Rewriter<'p> {
    /// Creates a rewriter for `pattern`, deriving its tag dispatch once.
    #[must_use]
    pub fn new(pattern: &'p Pattern) -> Self {
        Self {
            matcher: Matcher::new(pattern),
            dispatch: TagDispatch::for_pattern(pattern.root()),
        }
    }

    /// Routes every match evaluation through `tracer`.
    #[must_use]
    pub fn with_tracer(mut self, tracer: &'p dyn MatchTracer) -> Self {
        self.matcher = self.matcher.with_tracer(tracer);
        self
    }

    /// Returns the candidate root tags for this pattern.
    #[must_use]
    pub const fn dispatch(&self) -> &TagDispatch {
        &self.dispatch
    }

    /// Rewrites `source` by invoking `edit` for every occurrence in `tree`.
    ///
    /// Calling no edit primitive for an occurrence leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::OverlappingEdits`] or
    /// [`SyntaxError::EditOutOfBounds`] when the collected plan is invalid.
    pub fn rewrite<F>(
        &self,
        tree: &SyntaxNode,
        source: &str,
        mut edit: F,
    ) -> Result<RewriteResult, SyntaxError>
    where
        F: FnMut(&mut EditSession<'_>, &Occurrence<'_>),
    {
        self.try_rewrite(tree, source, |session, occurrence| {
            edit(session, occurrence);
            Ok(())
        })
    }

    /// As [`Rewriter::rewrite`], with a callback that may fail.
    ///
    /// # Errors
    ///
    /// Returns the first callback error, or any error from applying the
    /// collected plan.
    pub fn try_rewrite<F>(
        &self,
        tree: &SyntaxNode,
        source: &str,
        mut edit: F,
    ) -> Result<RewriteResult, SyntaxError>
    where
        F: FnMut(&mut EditSession<'_>, &Occurrence<'_>) -> Result<(), SyntaxError>,
    {
        let mut pass = Pass {
            plan: RewritePlan::new(),
            source,
            counter: 0,
        };
        self.visit(tree, &mut pass, &mut edit)?;

        let output = pass.plan.apply(source)?;
        Ok(RewriteResult {
            output,
            occurrences: pass.counter,
            edits: pass.plan.len(),
        })
    }

    fn visit<F>(&self, node: &SyntaxNode, pass: &mut Pass<'_>, edit: &mut F) -> Result<(), SyntaxError>
    where
        F: FnMut(&mut EditSession<'_>, &Occurrence<'_>) -> Result<(), SyntaxError>,
    {
        if self.dispatch.admits(node.tag()) {
            let outcome = self.matcher.match_node(node);
            if outcome.is_match() {
                pass.counter = pass.counter.saturating_add(1);
                let occurrence = Occurrence::new(node, outcome, pass.counter);
                let mut session = EditSession {
                    plan: &mut pass.plan,
                    source: pass.source,
                    match_index: pass.counter,
                };
                return edit(&mut session, &occurrence);
            }
        }
        for child in node.child_nodes() {
            self.visit(child, pass, edit)?;
        }
        Ok(())
    }
}

/// Mutable state of one rewrite pass.
struct Pass<'s> {
    plan: RewritePlan,
    source: &'s str,
    counter: usize,
}
