//! Shared position conversion helpers.
//!
//! Spans are zero-based byte offsets. For user-facing messages, we prefer
//! one-based line and column numbers, with columns counted in characters.

/// Converts a byte offset into one-based `(line, column)` coordinates.
///
/// Offsets past the end of `source` are clamped to its length; offsets that
/// split a character resolve to the start of that character.
#[must_use]
pub fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let mut end = offset.min(source.len());
    while end > 0 && !source.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    let before = source.get(..end).unwrap_or_default();
    let line = before.matches('\n').count().saturating_add(1);
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        .saturating_add(1);
    // Line/column numbers will realistically never exceed u32::MAX.
    (
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}
