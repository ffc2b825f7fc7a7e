//! Match outcomes, occurrences, and capture payloads.

use crate::node::{SyntaxNode, ValueRef};

/// Result of matching one pattern against one node.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    /// The pattern did not match.
    NoMatch,
    /// The pattern matched and contains no captures.
    Matched,
    /// The pattern matched and contains captures, listed in visit order.
    Captures(Vec<ValueRef<'a>>),
}

impl<'a> MatchOutcome<'a> {
    /// Returns whether the pattern matched.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Returns the captured values; empty unless this is
    /// [`MatchOutcome::Captures`].
    #[must_use]
    pub fn captures(&self) -> &[ValueRef<'a>] {
        match self {
            Self::Captures(values) => values,
            Self::NoMatch | Self::Matched => &[],
        }
    }
}

/// A location where a pattern matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    node: &'a SyntaxNode,
    outcome: MatchOutcome<'a>,
    index: usize,
}

impl<'a> Occurrence<'a> {
    pub(crate) const fn new(node: &'a SyntaxNode, outcome: MatchOutcome<'a>, index: usize) -> Self {
        Self {
            node,
            outcome,
            index,
        }
    }

    /// Returns the matched node.
    #[must_use]
    pub const fn node(&self) -> &'a SyntaxNode {
        self.node
    }

    /// Returns the match outcome for this node.
    #[must_use]
    pub const fn outcome(&self) -> &MatchOutcome<'a> {
        &self.outcome
    }

    /// Returns the captured values in visit order.
    #[must_use]
    pub fn captures(&self) -> &[ValueRef<'a>] {
        self.outcome.captures()
    }

    /// Returns the capture at `number` (1-based), if populated.
    #[must_use]
    pub fn capture(&self, number: usize) -> Option<ValueRef<'a>> {
        number
            .checked_sub(1)
            .and_then(|slot| self.captures().get(slot))
            .copied()
    }

    /// Returns the 1-based rank of this occurrence in traversal order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Capture payloads gathered across a whole tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured<'a> {
    /// Exactly one payload was produced.
    One(ValueRef<'a>),
    /// Zero or several payloads, in traversal order.
    Many(Vec<ValueRef<'a>>),
}

impl<'a> Captured<'a> {
    /// Collapses a payload list, unwrapping a single element.
    #[must_use]
    pub fn from_payloads(mut payloads: Vec<ValueRef<'a>>) -> Self {
        if payloads.len() == 1 {
            if let Some(only) = payloads.pop() {
                return Self::One(only);
            }
        }
        Self::Many(payloads)
    }

    /// Returns the payloads as a flat list.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValueRef<'a>> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}
