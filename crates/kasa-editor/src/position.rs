//! Buffer positions.
//!
//! All coordinates are **0-indexed**: line 0 is the first row, column 0 the
//! first character. Columns count chars in the row's raw text, not bytes and
//! not rendered cells — the tab-aware rendered column is derived per frame
//! and never stored here.

use std::fmt;

/// A position in the buffer: (line, column), both 0-indexed.
///
/// Ordered lexicographically, line first. That ordering is what lets a
/// visual selection normalize its anchor and cursor with a single `min`/`max`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_same_line() {
        assert!(Position::new(1, 3) < Position::new(1, 7));
    }

    #[test]
    fn ordering_line_dominates_column() {
        assert!(Position::new(0, 100) < Position::new(1, 0));
    }

    #[test]
    fn equality() {
        assert_eq!(Position::new(3, 3), Position::new(3, 3));
        assert_ne!(Position::new(3, 3), Position::new(3, 4));
    }

    #[test]
    fn min_max_normalize_a_backwards_pair() {
        let anchor = Position::new(3, 5);
        let cursor = Position::new(1, 2);
        let start = anchor.min(cursor);
        let end = anchor.max(cursor);
        assert_eq!(start, Position::new(1, 2));
        assert_eq!(end, Position::new(3, 5));
    }
}
