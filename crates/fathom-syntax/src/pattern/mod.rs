//! Pattern compilation for structural search.
//!
//! A pattern is a compact textual query over tree shapes:
//!
//! | syntax       | meaning                                               |
//! |--------------|-------------------------------------------------------|
//! | `_`          | any value that is present                             |
//! | `...`        | a node with at least one child                        |
//! | `nil`        | an absent child or a `nil` leaf                       |
//! | `42`, `1.5`  | numeric leaves                                        |
//! | `"text"`     | string leaves                                         |
//! | `name`       | a node tagged `name`, or an equal symbol/string leaf  |
//! | `(a b c)`    | head matches the node, the rest match its children    |
//! | `{a b}`      | any member matches                                    |
//! | `[a b]`      | every member matches                                  |
//! | `$p`         | capture whatever `p` matched                          |
//! | `!p`         | `p` does not match                                    |
//! | `?p`         | absent, or `p` matches                                |
//! | `^p`         | `p` matches some direct child node                    |
//! | `\N`         | equal to capture `N` from earlier in the same attempt |
//! | `%N`         | equal to argument `N` supplied at compile time        |

mod lexer;
mod parser;

use std::fmt;

use crate::error::SyntaxError;
use crate::matcher::{Captured, MatchOutcome, Matcher, Occurrence};
use crate::node::{SyntaxNode, Value, write_quoted};

/// A literal compared by equality.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// The absence marker.
    Nil,
    /// An integer leaf.
    Int(i64),
    /// A float leaf.
    Float(f64),
    /// A string leaf.
    Str(String),
    /// A node tag, or a symbol or string leaf with the same text.
    Symbol(String),
    /// A value bound through a `%N` argument slot, compared structurally.
    Value(Value),
}

/// A compiled matcher variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    /// `_`: any non-absent value.
    Wildcard,
    /// `...`: a node with at least one child.
    AnyNonEmpty,
    /// A literal compared by equality.
    Literal(LiteralValue),
    /// `( ... )`: head against the node, the rest against its children.
    Sequence(Vec<PatternNode>),
    /// `$p`: records the matched value.
    Capture(Box<PatternNode>),
    /// `{ ... }`: logical OR.
    Union(Vec<PatternNode>),
    /// `[ ... ]`: logical AND.
    Intersection(Vec<PatternNode>),
    /// `!p`: succeeds iff the inner pattern fails.
    Negation(Box<PatternNode>),
    /// `?p`: an absent target, or the inner pattern.
    Optional(Box<PatternNode>),
    /// `^p`: the inner pattern against any direct child node.
    AncestorSearch(Box<PatternNode>),
    /// `\N`: equality with the `N`th capture (1-based).
    Backreference(usize),
}

impl PatternNode {
    /// Counts the capture markers in this tree.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        match self {
            Self::Wildcard | Self::AnyNonEmpty | Self::Literal(_) | Self::Backreference(_) => 0,
            Self::Capture(inner) => inner.capture_count().saturating_add(1),
            Self::Negation(inner) | Self::Optional(inner) | Self::AncestorSearch(inner) => {
                inner.capture_count()
            }
            Self::Sequence(members) | Self::Union(members) | Self::Intersection(members) => members
                .iter()
                .map(Self::capture_count)
                .fold(0, usize::saturating_add),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => write_quoted(f, value),
            Self::Symbol(name) if reads_as_keyword(name) => write!(f, ":{name}"),
            Self::Symbol(name) => f.write_str(name),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for PatternNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("_"),
            Self::AnyNonEmpty => f.write_str("..."),
            Self::Literal(literal) => fmt::Display::fmt(literal, f),
            Self::Sequence(members) => write_group(f, '(', members, ')'),
            Self::Union(members) => write_group(f, '{', members, '}'),
            Self::Intersection(members) => write_group(f, '[', members, ']'),
            Self::Capture(inner) => write!(f, "${inner}"),
            Self::Negation(inner) => write!(f, "!{inner}"),
            Self::Optional(inner) => write!(f, "?{inner}"),
            Self::AncestorSearch(inner) => write!(f, "^{inner}"),
            Self::Backreference(index) => write!(f, "\\{index}"),
        }
    }
}

/// Whether a bare `name` would lex as something other than a symbol.
fn reads_as_keyword(name: &str) -> bool {
    matches!(name, "nil" | "_") || name.starts_with(|c: char| c.is_ascii_digit())
}

fn write_group(
    f: &mut fmt::Formatter<'_>,
    open: char,
    members: &[PatternNode],
    close: char,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (position, member) in members.iter().enumerate() {
        if position > 0 {
            f.write_str(" ")?;
        }
        fmt::Display::fmt(member, f)?;
    }
    write!(f, "{close}")
}

/// A compiled structural pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    root: PatternNode,
    capture_count: usize,
}

impl Pattern {
    /// Compiles pattern text.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::MalformedPattern`] for an invalid token stream
    /// and [`SyntaxError::UnterminatedGroup`] when a bracket is never closed.
    pub fn compile(source: &str) -> Result<Self, SyntaxError> {
        Self::compile_with_args(source, &[])
    }

    /// Compiles pattern text, binding `%1`, `%2`, … to `args` in order.
    ///
    /// # Errors
    ///
    /// As [`Pattern::compile`], plus [`SyntaxError::MalformedPattern`] when
    /// a slot has no corresponding argument.
    pub fn compile_with_args(source: &str, args: &[Value]) -> Result<Self, SyntaxError> {
        let tokens = lexer::tokenize(source)?;
        let root = parser::parse(&tokens, source.len(), args)?;
        Ok(Self {
            source: source.to_owned(),
            capture_count: root.capture_count(),
            root,
        })
    }

    /// Wraps an already-built pattern tree.
    #[must_use]
    pub fn from_node(root: PatternNode) -> Self {
        Self {
            source: root.to_string(),
            capture_count: root.capture_count(),
            root,
        }
    }

    /// Returns the text this pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root of the pattern tree.
    #[must_use]
    pub const fn root(&self) -> &PatternNode {
        &self.root
    }

    /// Returns how many capture markers the pattern contains.
    #[must_use]
    pub const fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// Returns whether a successful match yields a capture list.
    #[must_use]
    pub const fn has_captures(&self) -> bool {
        self.capture_count > 0
    }

    /// Matches this pattern against a single node.
    #[must_use]
    pub fn match_node<'a>(&self, node: &'a SyntaxNode) -> MatchOutcome<'a> {
        Matcher::new(self).match_node(node)
    }

    /// Finds every occurrence in `root`, in pre-order.
    #[must_use]
    pub fn search<'a>(&self, root: &'a SyntaxNode) -> Vec<Occurrence<'a>> {
        Matcher::new(self).search(root)
    }

    /// Collects capture payloads from every occurrence in `root`.
    #[must_use]
    pub fn capture<'a>(&self, root: &'a SyntaxNode) -> Captured<'a> {
        Matcher::new(self).capture(root)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Pattern {
    type Err = SyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::compile(source)
    }
}

#[cfg(test)]
mod tests;
