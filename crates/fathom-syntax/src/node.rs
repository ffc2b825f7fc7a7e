//! Immutable syntax tree model.
//!
//! A [`SyntaxNode`] carries a tag naming its syntactic kind, an ordered list
//! of children, and an optional source span. Children are either nested
//! nodes or scalar leaves. Equality is structural: spans never participate,
//! so two nodes parsed from different offsets compare equal when their shape
//! and scalars agree.

use std::fmt;
use std::ops::Range;

/// A half-open byte range into one source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a span covering `start..end`.
    ///
    /// A reversed pair is normalised so that `start <= end` always holds.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a zero-length span at `offset`.
    #[must_use]
    pub const fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns the number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the span as a byte range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// An opaque scalar stored in a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string literal.
    Str(String),
    /// A symbol, printed with a leading colon.
    Sym(String),
    /// The absence marker.
    Nil,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => write_quoted(f, value),
            Self::Sym(value) => write!(f, ":{value}"),
            Self::Nil => f.write_str("nil"),
        }
    }
}

/// Writes `value` as a double-quoted string literal.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

/// A scalar child together with its source span.
#[derive(Debug, Clone)]
pub struct Leaf {
    scalar: Scalar,
    span: Option<Span>,
}

impl Leaf {
    /// Creates a leaf without a source span.
    #[must_use]
    pub const fn new(scalar: Scalar) -> Self {
        Self { scalar, span: None }
    }

    /// Attaches a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Returns the scalar payload.
    #[must_use]
    pub const fn scalar(&self) -> &Scalar {
        &self.scalar
    }

    /// Returns the source span, if known.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Returns whether this leaf holds the absence marker.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self.scalar, Scalar::Nil)
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.scalar == other.scalar
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.scalar.fmt(f)
    }
}

/// An owned child of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A nested node.
    Node(SyntaxNode),
    /// A scalar leaf.
    Leaf(Leaf),
}

impl Value {
    /// Builds an integer leaf.
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Leaf(Leaf::new(Scalar::Int(value)))
    }

    /// Builds a float leaf.
    #[must_use]
    pub const fn float(value: f64) -> Self {
        Self::Leaf(Leaf::new(Scalar::Float(value)))
    }

    /// Builds a string leaf.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Leaf(Leaf::new(Scalar::Str(value.into())))
    }

    /// Builds a symbol leaf.
    #[must_use]
    pub fn sym(value: impl Into<String>) -> Self {
        Self::Leaf(Leaf::new(Scalar::Sym(value.into())))
    }

    /// Builds a nil leaf.
    #[must_use]
    pub const fn nil() -> Self {
        Self::Leaf(Leaf::new(Scalar::Nil))
    }

    /// Borrows this value.
    #[must_use]
    pub const fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Self::Node(node) => ValueRef::Node(node),
            Self::Leaf(leaf) => ValueRef::Leaf(leaf),
        }
    }

    /// Returns the nested node, if this value is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the source span, if known.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::Node(node) => node.span(),
            Self::Leaf(leaf) => leaf.span(),
        }
    }
}

impl From<SyntaxNode> for Value {
    fn from(node: SyntaxNode) -> Self {
        Self::Node(node)
    }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Leaf(Leaf::new(scalar))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value_ref().fmt(f)
    }
}

/// A borrowed child, as handed out by matching and search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    /// A nested node.
    Node(&'a SyntaxNode),
    /// A scalar leaf.
    Leaf(&'a Leaf),
}

impl<'a> ValueRef<'a> {
    /// Returns the node, if this is one.
    #[must_use]
    pub const fn as_node(self) -> Option<&'a SyntaxNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the scalar, if this is a leaf.
    #[must_use]
    pub const fn as_scalar(self) -> Option<&'a Scalar> {
        match self {
            Self::Node(_) => None,
            Self::Leaf(leaf) => Some(leaf.scalar()),
        }
    }

    /// Returns the source span, if known.
    #[must_use]
    pub const fn span(self) -> Option<Span> {
        match self {
            Self::Node(node) => node.span(),
            Self::Leaf(leaf) => leaf.span(),
        }
    }

    /// Returns the text this value occupies in `source`.
    ///
    /// Values without a span, or whose span falls outside `source`, render
    /// through [`fmt::Display`] instead.
    #[must_use]
    pub fn source_text(self, source: &str) -> String {
        self.span()
            .and_then(|span| source.get(span.range()))
            .map_or_else(|| self.to_string(), str::to_owned)
    }

    /// Clones the referenced value.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Node(node) => Value::Node(node.clone()),
            Self::Leaf(leaf) => Value::Leaf(leaf.clone()),
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => node.fmt(f),
            Self::Leaf(leaf) => leaf.fmt(f),
        }
    }
}

/// An immutable tagged tree node.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    tag: String,
    children: Vec<Value>,
    span: Option<Span>,
}

impl SyntaxNode {
    /// Creates a node without a source span.
    #[must_use]
    pub fn new(tag: impl Into<String>, children: Vec<Value>) -> Self {
        Self {
            tag: tag.into(),
            children,
            span: None,
        }
    }

    /// Attaches a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Returns the tag naming this node's kind.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Value] {
        &self.children
    }

    /// Returns the child at `index`, if present.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Value> {
        self.children.get(index)
    }

    /// Iterates over the children that are themselves nodes.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Value::as_node)
    }

    /// Returns the source span, if known.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Counts this node and every node beneath it.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.child_nodes()
            .map(Self::descendant_count)
            .fold(1, usize::saturating_add)
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.children == other.children
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.tag)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}
