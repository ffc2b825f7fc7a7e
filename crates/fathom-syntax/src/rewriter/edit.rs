//! Text edits and their application to a source buffer.
//!
//! Edits are anchored to byte offsets in the original buffer. A plan is
//! validated as a whole before any text is produced: spans must lie inside
//! the buffer on character boundaries, and no two edits may overlap.

use crate::error::SyntaxError;
use crate::node::Span;

/// A single replacement within a buffer.
///
/// Insertions are zero-length replacements; removals replace with nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    span: Span,
    new_text: String,
}

impl TextEdit {
    /// Replaces the text covered by `span`.
    #[must_use]
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    /// Deletes the text covered by `span`.
    #[must_use]
    pub const fn remove(span: Span) -> Self {
        Self {
            span,
            new_text: String::new(),
        }
    }

    /// Inserts text at `offset`.
    #[must_use]
    pub fn insert_at(offset: usize, new_text: impl Into<String>) -> Self {
        Self::replace(Span::point(offset), new_text)
    }

    /// Returns the span being replaced.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the replacement text.
    #[must_use]
    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Returns whether this edit only inserts text.
    #[must_use]
    pub const fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// An ordered collection of edits against one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    edits: Vec<TextEdit>,
}

impl RewritePlan {
    /// Creates an empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self { edits: Vec::new() }
    }

    /// Appends an edit.
    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Returns the edits in the order they were added.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Returns the number of edits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns whether the plan holds no edits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the plan to `source`, producing the patched text.
    ///
    /// Edits are applied in offset order. Insertions at the same offset keep
    /// the order they were added, and an insertion at the start of a replaced
    /// span lands before the replacement text.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::EditOutOfBounds`] for a span outside `source`
    /// or off a character boundary, and [`SyntaxError::OverlappingEdits`]
    /// when two spans intersect.
    pub fn apply(&self, source: &str) -> Result<String, SyntaxError> {
        for edit in &self.edits {
            let span = edit.span();
            if span.end() > source.len()
                || !source.is_char_boundary(span.start())
                || !source.is_char_boundary(span.end())
            {
                return Err(SyntaxError::EditOutOfBounds {
                    span,
                    len: source.len(),
                });
            }
        }

        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        ordered.sort_by(|a, b| {
            a.span()
                .start()
                .cmp(&b.span().start())
                .then_with(|| b.is_insertion().cmp(&a.is_insertion()))
        });

        for pair in ordered.windows(2) {
            if let [first, second] = pair {
                if second.span().start() < first.span().end() {
                    return Err(SyntaxError::OverlappingEdits {
                        first: first.span(),
                        second: second.span(),
                    });
                }
            }
        }

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in ordered {
            output.push_str(source.get(cursor..edit.span().start()).unwrap_or_default());
            output.push_str(edit.new_text());
            cursor = edit.span().end();
        }
        output.push_str(source.get(cursor..).unwrap_or_default());
        Ok(output)
    }
}

impl FromIterator<TextEdit> for RewritePlan {
    fn from_iter<I: IntoIterator<Item = TextEdit>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn empty_plan_returns_original_text() {
        let source = "(send nil :puts (str \"é\"))";
        assert_eq!(RewritePlan::new().apply(source).expect("apply"), source);
    }

    #[test]
    fn applies_disjoint_edits_in_offset_order() {
        let source = "(a 1) (b 2) (c 3)";
        let plan: RewritePlan = [
            TextEdit::replace(Span::new(12, 17), "(z 9)"),
            TextEdit::remove(Span::new(5, 11)),
            TextEdit::insert_at(0, ";"),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.apply(source).expect("apply"), ";(a 1) (z 9)");
    }

    #[test]
    fn insertions_at_one_offset_keep_call_order() {
        let plan: RewritePlan = [
            TextEdit::replace(Span::new(0, 1), "X"),
            TextEdit::insert_at(0, "1"),
            TextEdit::insert_at(0, "2"),
            TextEdit::insert_at(1, "3"),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.apply("ab").expect("apply"), "12X3b");
    }

    #[rstest]
    #[case(Span::new(0, 4), Span::new(3, 6))]
    #[case(Span::new(2, 5), Span::new(2, 3))]
    #[case(Span::new(0, 6), Span::point(3))]
    fn rejects_overlapping_edits(#[case] first: Span, #[case] second: Span) {
        let plan: RewritePlan = [
            TextEdit::replace(first, "x"),
            TextEdit::replace(second, "y"),
        ]
        .into_iter()
        .collect();
        let err = plan.apply("abcdefgh").expect_err("should overlap");
        assert!(matches!(err, SyntaxError::OverlappingEdits { .. }), "{err}");
    }

    #[test]
    fn adjacent_edits_do_not_overlap() {
        let plan: RewritePlan = [
            TextEdit::replace(Span::new(0, 2), "x"),
            TextEdit::replace(Span::new(2, 4), "y"),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.apply("abcd").expect("apply"), "xy");
    }

    #[rstest]
    #[case(Span::new(0, 9))]
    #[case(Span::new(1, 2))]
    fn rejects_spans_outside_buffer_or_mid_character(#[case] span: Span) {
        let plan: RewritePlan = std::iter::once(TextEdit::remove(span)).collect();
        let err = plan.apply("éa").expect_err("should be out of bounds");
        assert!(matches!(err, SyntaxError::EditOutOfBounds { .. }), "{err}");
    }
}
