//! Visual-selection geometry and the yank/delete extraction it addresses.
//!
//! A selection is an anchor fixed at visual-mode entry plus the live cursor.
//! Nothing here is normalized in place: every query recomputes (start, end)
//! fresh from anchor + cursor, so dragging backwards over the anchor keeps
//! working. Line-wise selections cover whole rows regardless of columns;
//! character selections are inclusive at both ends.
//!
//! Yank and delete share one extraction so `d` always produces exactly the
//! text a `y` of the same range would.

use crate::buffer::Buffer;
use crate::position::Position;

/// The anchored end of a visual selection.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub anchor: Position,
    /// True for `V` (line-wise), false for `v` (character-wise).
    pub line_wise: bool,
}

impl Selection {
    #[must_use]
    pub const fn new(anchor: Position, line_wise: bool) -> Self {
        Self { anchor, line_wise }
    }

    /// The normalized, inclusive (start, end) of the selection.
    ///
    /// Line-wise: column 0 of the first covered row through the last column
    /// of the last covered row. Character-wise: the literal anchor/cursor
    /// positions in (row, col) order. The end column is clamped to the end
    /// row's last character in both cases.
    #[must_use]
    pub fn range(&self, buf: &Buffer, cursor: Position) -> (Position, Position) {
        if self.line_wise {
            let top = self.anchor.line.min(cursor.line);
            let bottom = self.anchor.line.max(cursor.line);
            let end_col = buf.row_len(bottom).saturating_sub(1);
            return (Position::new(top, 0), Position::new(bottom, end_col));
        }

        let start = self.anchor.min(cursor);
        let mut end = self.anchor.max(cursor);
        let len = buf.row_len(end.line);
        if end.col >= len {
            end.col = len.saturating_sub(1);
        }
        (start, end)
    }

    /// Whether the cell at (`row`, rendered column) falls inside the
    /// selection. The rendered column is mapped back through the row's tab
    /// expansion before the inclusion test.
    #[must_use]
    pub fn is_selected(
        &self,
        buf: &Buffer,
        cursor: Position,
        row: usize,
        rendered_col: usize,
    ) -> bool {
        let (start, end) = self.range(buf, cursor);
        if row < start.line || row > end.line {
            return false;
        }
        if self.line_wise {
            return true;
        }

        let col = buf
            .row(row)
            .map_or(rendered_col, |r| r.rx_to_cx(rendered_col, buf.tab_stop()));
        if row == start.line && col < start.col {
            return false;
        }
        if row == end.line && col > end.col {
            return false;
        }
        true
    }

    /// The selected text, rows joined with `\n` (no trailing one).
    #[must_use]
    pub fn extract(&self, buf: &Buffer, cursor: Position) -> String {
        let (start, end) = self.range(buf, cursor);
        extract_range(buf, start, end)
    }
}

/// Collect the text covered by an inclusive, normalized range.
#[must_use]
pub fn extract_range(buf: &Buffer, start: Position, end: Position) -> String {
    let mut out = String::new();
    for y in start.line..=end.line {
        let Some(row) = buf.row(y) else { break };
        let len = row.len();
        let from = if y == start.line { start.col } else { 0 };
        let to = if y == end.line {
            end.col.min(len.saturating_sub(1))
        } else {
            len.saturating_sub(1)
        };
        if len > 0 && from <= to {
            out.extend(row.raw.chars().skip(from).take(to - from + 1));
        }
        if y < end.line {
            out.push('\n');
        }
    }
    out
}

/// Remove the text covered by an inclusive, normalized range.
///
/// Same-row spans splice the row. Multi-row spans truncate the start row at
/// its start column, splice on whatever survives of the end row past the
/// end column, then drop the fully covered middle and end rows. Returns the
/// position the cursor lands on (the range start).
pub fn delete_range(buf: &mut Buffer, start: Position, end: Position) -> Position {
    if start.line == end.line {
        buf.delete_span(start.line, start.col, end.col);
        return start;
    }

    let tail: String = buf.row(end.line).map_or_else(String::new, |r| {
        r.raw.chars().skip(end.col + 1).collect()
    });

    buf.truncate_row(start.line, start.col);
    buf.append_text(start.line, &tail);
    for _ in start.line..end.line {
        buf.delete_row(start.line + 1);
    }
    start
}

/// Remove whole rows `first..=last` (a line-wise delete). Unlike
/// [`delete_range`], no empty joined row survives: the rows go entirely,
/// and the buffer re-seeds a single empty row when everything goes.
/// Returns the cursor landing position: the row that slid into the hole,
/// column 0.
pub fn delete_rows(buf: &mut Buffer, first: usize, last: usize) -> Position {
    for _ in first..=last {
        buf.delete_row(first);
    }
    Position::new(first.min(buf.num_rows().saturating_sub(1)), 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer_with(lines: &[&str]) -> Buffer {
        let mut buf = Buffer::new(8);
        buf.import_text(lines.iter().map(|s| (*s).to_string()).collect());
        buf
    }

    fn raw_lines(buf: &Buffer) -> Vec<&str> {
        buf.rows().iter().map(|r| r.raw.as_str()).collect()
    }

    // -- Normalization ------------------------------------------------------

    #[test]
    fn backwards_drag_selects_the_same_cells() {
        let buf = buffer_with(&["abcdef", "ghijkl", "mnopqr", "stuvwx"]);
        let forward = Selection::new(Position::new(1, 2), false);
        let backward = Selection::new(Position::new(3, 5), false);

        for row in 0..4 {
            for col in 0..6 {
                assert_eq!(
                    forward.is_selected(&buf, Position::new(3, 5), row, col),
                    backward.is_selected(&buf, Position::new(1, 2), row, col),
                    "cell ({row},{col})"
                );
            }
        }
    }

    #[test]
    fn line_wise_range_covers_full_rows_in_either_direction() {
        let buf = buffer_with(&["aaa", "bbbbb", "cc"]);
        let down = Selection::new(Position::new(0, 2), true);
        assert_eq!(
            down.range(&buf, Position::new(2, 0)),
            (Position::new(0, 0), Position::new(2, 1))
        );
        let up = Selection::new(Position::new(2, 0), true);
        assert_eq!(
            up.range(&buf, Position::new(0, 2)),
            (Position::new(0, 0), Position::new(2, 1))
        );
    }

    #[test]
    fn end_column_clamps_to_the_row() {
        let buf = buffer_with(&["ab", ""]);
        let sel = Selection::new(Position::new(0, 0), false);
        let (_, end) = sel.range(&buf, Position::new(1, 5));
        assert_eq!(end, Position::new(1, 0));
    }

    // -- Inclusion ----------------------------------------------------------

    #[test]
    fn char_selection_is_inclusive_at_both_ends() {
        let buf = buffer_with(&["abcdef"]);
        let sel = Selection::new(Position::new(0, 1), false);
        let cur = Position::new(0, 3);
        assert!(!sel.is_selected(&buf, cur, 0, 0));
        assert!(sel.is_selected(&buf, cur, 0, 1));
        assert!(sel.is_selected(&buf, cur, 0, 3));
        assert!(!sel.is_selected(&buf, cur, 0, 4));
        assert!(!sel.is_selected(&buf, cur, 1, 0));
    }

    #[test]
    fn rendered_columns_map_through_tabs() {
        let buf = buffer_with(&["\tab"]);
        // Select the tab only (char col 0). Every cell of the expanded tab
        // counts as selected; 'a' at rendered col 8 does not.
        let sel = Selection::new(Position::new(0, 0), false);
        let cur = Position::new(0, 0);
        for cell in 0..8 {
            assert!(sel.is_selected(&buf, cur, 0, cell), "cell {cell}");
        }
        assert!(!sel.is_selected(&buf, cur, 0, 8));
    }

    // -- Extraction ---------------------------------------------------------

    #[test]
    fn extract_joins_rows_with_newlines() {
        let buf = buffer_with(&["abcdef", "ghijkl", "mnopqr"]);
        let sel = Selection::new(Position::new(0, 3), false);
        assert_eq!(sel.extract(&buf, Position::new(2, 2)), "def\nghijkl\nmno");
    }

    #[test]
    fn extract_keeps_newlines_for_empty_covered_rows() {
        let buf = buffer_with(&["ab", "", "cd"]);
        let sel = Selection::new(Position::new(0, 0), true);
        assert_eq!(sel.extract(&buf, Position::new(2, 0)), "ab\n\ncd");
    }

    #[test]
    fn same_row_extract() {
        let buf = buffer_with(&["hello world"]);
        let sel = Selection::new(Position::new(0, 6), false);
        assert_eq!(sel.extract(&buf, Position::new(0, 10)), "world");
    }

    // -- Deletion -----------------------------------------------------------

    #[test]
    fn same_row_delete_splices() {
        let mut buf = buffer_with(&["hello world"]);
        let cursor = delete_range(&mut buf, Position::new(0, 5), Position::new(0, 10));
        assert_eq!(raw_lines(&buf), vec!["hello"]);
        assert_eq!(cursor, Position::new(0, 5));
    }

    #[test]
    fn multi_row_delete_splices_the_surviving_tail() {
        let mut buf = buffer_with(&["head TAIL", "middle", "gone END"]);
        let cursor = delete_range(&mut buf, Position::new(0, 5), Position::new(2, 3));
        assert_eq!(raw_lines(&buf), vec!["head  END"]);
        assert_eq!(cursor, Position::new(0, 5));
    }

    #[test]
    fn line_wise_delete_of_middle_rows() {
        // Rows 2..4 (1-indexed) of a 5-row buffer: 2 rows remain, cursor on
        // the former row 2.
        let mut buf = buffer_with(&["one", "two", "three", "four", "five"]);
        let sel = Selection::new(Position::new(1, 0), true);
        let cursor_pos = Position::new(3, 0);
        let (start, end) = sel.range(&buf, cursor_pos);
        let cursor = delete_rows(&mut buf, start.line, end.line);
        assert_eq!(raw_lines(&buf), vec!["one", "five"]);
        assert_eq!(cursor, Position::new(1, 0));
    }

    #[test]
    fn deleting_every_row_reseeds_one_empty_row() {
        let mut buf = buffer_with(&["a", "b"]);
        let sel = Selection::new(Position::new(0, 0), true);
        let (start, end) = sel.range(&buf, Position::new(1, 0));
        let cursor = delete_rows(&mut buf, start.line, end.line);
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(raw_lines(&buf), vec![""]);
        assert_eq!(cursor, Position::new(0, 0));
    }

    #[test]
    fn delete_matches_extract() {
        let mut buf = buffer_with(&["alpha", "beta", "gamma"]);
        let sel = Selection::new(Position::new(0, 2), false);
        let cur = Position::new(2, 1);
        let (start, end) = sel.range(&buf, cur);
        let text = extract_range(&buf, start, end);
        assert_eq!(text, "pha\nbeta\nga");
        delete_range(&mut buf, start, end);
        assert_eq!(raw_lines(&buf), vec!["almma"]);
    }
}
