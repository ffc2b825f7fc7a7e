//! Template-driven rewrite rules.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::SyntaxError;
use crate::matcher::Occurrence;
use crate::node::{SyntaxNode, ValueRef};
use crate::pattern::Pattern;

use super::{RewriteResult, Rewriter};

/// A structural rewrite rule.
///
/// Combines a pattern with a replacement template. In the template, `$N`
/// inserts the source text of capture `N`, `$0` the whole matched node, and
/// `$$` a literal dollar sign.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Pattern,
    template: String,
    only: Option<usize>,
}

impl RewriteRule {
    /// Creates a new rewrite rule.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidReplacement`] if the template refers to
    /// a capture the pattern does not define.
    pub fn new(pattern: Pattern, template: impl Into<String>) -> Result<Self, SyntaxError> {
        let template_str = template.into();
        for reference in extract_template_refs(&template_str) {
            if reference > pattern.capture_count() {
                return Err(SyntaxError::invalid_replacement(format!(
                    "template references ${reference} but the pattern has {} capture(s)",
                    pattern.capture_count()
                )));
            }
        }
        Ok(Self {
            pattern,
            template: template_str,
            only: None,
        })
    }

    /// Restricts the rule to the occurrence numbered `index` (1-based).
    #[must_use]
    pub const fn only(mut self, index: usize) -> Self {
        self.only = Some(index);
        self
    }

    /// Returns the pattern for this rule.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the replacement template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the occurrence this rule is restricted to, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.only
    }

    /// Applies the rule to `tree`, whose spans index into `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::MissingSpan`] when a rewritten node has no
    /// span, and any error from applying the resulting plan.
    pub fn apply(&self, tree: &SyntaxNode, source: &str) -> Result<RewriteResult, SyntaxError> {
        Rewriter::new(&self.pattern).try_rewrite(tree, source, |session, occurrence| {
            if self.only.is_some_and(|index| index != session.match_index()) {
                return Ok(());
            }
            let node = occurrence.node();
            let span = node.span().ok_or_else(|| SyntaxError::missing_span(node.tag()))?;
            let text = self.render(occurrence, session.source());
            session.replace(span, text);
            Ok(())
        })
    }

    /// Expands the template for one occurrence.
    #[must_use]
    pub fn render(&self, occurrence: &Occurrence<'_>, source: &str) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.char_indices().peekable();
        while let Some((_, ch)) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            if chars.next_if(|(_, c)| *c == '$').is_some() {
                out.push('$');
                continue;
            }
            match take_number(&mut chars) {
                Some(0) => out.push_str(&ValueRef::Node(occurrence.node()).source_text(source)),
                Some(number) => {
                    if let Some(value) = occurrence.capture(number) {
                        out.push_str(&value.source_text(source));
                    }
                }
                None => out.push('$'),
            }
        }
        out
    }
}

/// Extracts capture references from a replacement template.
fn extract_template_refs(template: &str) -> Vec<usize> {
    let mut refs = Vec::new();
    let mut chars = template.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch != '$' || chars.next_if(|(_, c)| *c == '$').is_some() {
            continue;
        }
        if let Some(number) = take_number(&mut chars) {
            refs.push(number);
        }
    }
    refs
}

fn take_number(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some((_, digit)) = chars.next_if(|(_, c)| c.is_ascii_digit()) {
        digits.push(digit);
    }
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(usize::MAX))
}
