//! Structural pattern matching and rewriting over syntax trees.
//!
//! This crate provides:
//!
//! - **A tree model** via [`SyntaxNode`], [`Value`] and [`Span`], built by
//!   any [`Frontend`]; [`SexpFrontend`] reads S-expression text
//! - **Pattern compilation** via [`Pattern`] for a compact structural query
//!   language with captures, unions, negation and backreferences
//! - **Search** via [`Matcher`], a pre-order walk yielding numbered
//!   [`Occurrence`]s
//! - **Rewriting** via [`Rewriter`] and [`RewriteRule`], turning occurrences
//!   into a validated [`RewritePlan`] of text edits
//!
//! # Example: Search
//!
//! ```
//! use fathom_syntax::{Pattern, sexp};
//!
//! let tree = sexp::parse("(begin (send nil :puts (int 1)) (send nil :p (int 2)))")?;
//! let pattern = Pattern::compile("(send nil puts $_)")?;
//!
//! let occurrences = pattern.search(&tree);
//! assert_eq!(occurrences.len(), 1);
//! # Ok::<(), fathom_syntax::SyntaxError>(())
//! ```
//!
//! # Example: Rewriting
//!
//! ```
//! use fathom_syntax::{Pattern, RewriteRule, sexp};
//!
//! let source = "(begin (int 1) (int 1))";
//! let tree = sexp::parse(source)?;
//! let rule = RewriteRule::new(Pattern::compile("(int $_)")?, "(float $1.0)")?.only(2);
//!
//! let result = rule.apply(&tree, source)?;
//! assert_eq!(result.output(), "(begin (int 1) (float 1.0))");
//! # Ok::<(), fathom_syntax::SyntaxError>(())
//! ```

mod error;
mod matcher;
mod node;
mod pattern;
pub mod position;
mod rewriter;
pub mod sexp;

pub use error::SyntaxError;
pub use matcher::{
    Attempt, Captured, LogTracer, MatchOutcome, MatchTracer, Matcher, NoopTracer, Occurrence,
    RecordingTracer,
};
pub use node::{Leaf, Scalar, Span, SyntaxNode, Value, ValueRef};
pub use pattern::{LiteralValue, Pattern, PatternNode};
pub use rewriter::{
    EditSession, RewritePlan, RewriteResult, RewriteRule, Rewriter, TagDispatch, TextEdit,
};
pub use sexp::{Frontend, SexpFrontend};

#[cfg(test)]
mod tests;
