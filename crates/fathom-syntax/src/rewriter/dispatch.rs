//! Candidate root-tag sets for rewrite dispatch.

use std::collections::BTreeSet;

use crate::node::Value;
use crate::pattern::{LiteralValue, PatternNode};

/// The node tags a pattern could match at its root.
///
/// Computed once per pattern. During a rewrite pass the matcher only runs on
/// nodes whose tag the dispatch admits; this never changes which nodes match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagDispatch {
    /// Any tag may match.
    Any,
    /// Only nodes with one of these tags may match.
    Tags(BTreeSet<String>),
}

impl TagDispatch {
    /// Derives the candidate set from a pattern's root.
    #[must_use]
    pub fn for_pattern(root: &PatternNode) -> Self {
        match root {
            PatternNode::Sequence(members) => members.first().map_or(Self::Any, Self::for_pattern),
            PatternNode::Literal(LiteralValue::Symbol(tag)) => Self::single(tag),
            PatternNode::Literal(LiteralValue::Value(Value::Node(node))) => Self::single(node.tag()),
            PatternNode::Literal(_) => Self::Tags(BTreeSet::new()),
            PatternNode::Capture(inner) | PatternNode::Optional(inner) => Self::for_pattern(inner),
            PatternNode::Union(members) => members
                .iter()
                .map(Self::for_pattern)
                .try_fold(BTreeSet::new(), |mut tags, member| match member {
                    Self::Any => None,
                    Self::Tags(more) => {
                        tags.extend(more);
                        Some(tags)
                    }
                })
                .map_or(Self::Any, Self::Tags),
            PatternNode::Intersection(members) => members
                .iter()
                .map(Self::for_pattern)
                .fold(Self::Any, Self::intersect),
            PatternNode::Wildcard
            | PatternNode::AnyNonEmpty
            | PatternNode::Negation(_)
            | PatternNode::AncestorSearch(_)
            | PatternNode::Backreference(_) => Self::Any,
        }
    }

    /// Returns whether a node tagged `tag` should be tested.
    #[must_use]
    pub fn admits(&self, tag: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.contains(tag),
        }
    }

    /// Returns the candidate tags, or `None` when any tag may match.
    #[must_use]
    pub const fn tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Any => None,
            Self::Tags(tags) => Some(tags),
        }
    }

    fn single(tag: &str) -> Self {
        Self::Tags(BTreeSet::from([tag.to_owned()]))
    }

    fn intersect(self, other: Self) -> Self {
        match (self, other) {
            (Self::Any, constrained) | (constrained, Self::Any) => constrained,
            (Self::Tags(left), Self::Tags(right)) => {
                Self::Tags(left.intersection(&right).cloned().collect())
            }
        }
    }
}
