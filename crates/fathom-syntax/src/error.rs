//! Error types for pattern compilation, tree reading, and rewriting.

use thiserror::Error;

use crate::node::Span;

/// Errors from syntactic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// The pattern text is not a valid token stream or expression.
    #[error("malformed pattern at offset {offset}: {message}")]
    MalformedPattern {
        /// Byte offset of the offending token.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A group was opened but never closed.
    #[error("unterminated group: '{opener}' at offset {offset} is never closed")]
    UnterminatedGroup {
        /// The opening bracket character.
        opener: char,
        /// Byte offset of the opening bracket.
        offset: usize,
    },

    /// Source text could not be read as a syntax tree.
    #[error("failed to parse source at offset {offset}: {message}")]
    SourceParse {
        /// Byte offset where reading failed.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// Two edits in one plan target intersecting spans.
    #[error("overlapping edits: {first} intersects {second}")]
    OverlappingEdits {
        /// The earlier edit's span.
        first: Span,
        /// The later edit's span.
        second: Span,
    },

    /// An edit span falls outside the buffer or splits a character.
    #[error("edit {span} is outside the {len}-byte buffer or not on a character boundary")]
    EditOutOfBounds {
        /// The offending span.
        span: Span,
        /// Length of the buffer in bytes.
        len: usize,
    },

    /// A matched node has no source span to rewrite.
    #[error("matched node '{tag}' has no source span")]
    MissingSpan {
        /// Tag of the span-less node.
        tag: String,
    },

    /// Invalid replacement template.
    #[error("invalid replacement template: {message}")]
    InvalidReplacement {
        /// Description of the replacement error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a malformed pattern error.
    #[must_use]
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedPattern {
            offset,
            message: message.into(),
        }
    }

    /// Creates an unterminated group error.
    #[must_use]
    pub const fn unterminated(opener: char, offset: usize) -> Self {
        Self::UnterminatedGroup { opener, offset }
    }

    /// Creates a source parse error.
    #[must_use]
    pub fn source_parse(offset: usize, message: impl Into<String>) -> Self {
        Self::SourceParse {
            offset,
            message: message.into(),
        }
    }

    /// Creates an invalid replacement error.
    #[must_use]
    pub fn invalid_replacement(message: impl Into<String>) -> Self {
        Self::InvalidReplacement {
            message: message.into(),
        }
    }

    /// Creates a missing span error.
    #[must_use]
    pub fn missing_span(tag: impl Into<String>) -> Self {
        Self::MissingSpan { tag: tag.into() }
    }

    /// Returns the byte offset the error points at, when it has one.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::MalformedPattern { offset, .. }
            | Self::UnterminatedGroup { offset, .. }
            | Self::SourceParse { offset, .. } => Some(*offset),
            Self::OverlappingEdits { second, .. } => Some(second.start()),
            Self::EditOutOfBounds { span, .. } => Some(span.start()),
            Self::MissingSpan { .. } | Self::InvalidReplacement { .. } => None,
        }
    }

    /// Returns whether the error was raised while compiling a pattern.
    #[must_use]
    pub const fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPattern { .. } | Self::UnterminatedGroup { .. }
        )
    }
}
