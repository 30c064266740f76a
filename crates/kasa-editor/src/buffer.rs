//! The line buffer: an ordered collection of rows plus the state derived
//! from them.
//!
//! All mutation funnels through here so the row invariants hold after every
//! public call: indices stay contiguous, every touched row is re-rendered
//! and re-highlighted (with open-comment propagation), and the dirty counter
//! moves. Out-of-range indices are clamped or ignored, never fatal — the
//! modal layer legitimately pokes at buffer boundaries.

use std::path::{Path, PathBuf};

use crate::row::Row;
use crate::syntax::{self, Language};

/// The in-memory document.
#[derive(Debug, Default)]
pub struct Buffer {
    rows: Vec<Row>,
    /// Counts mutations since the last save. Zero means clean.
    dirty: u64,
    filename: Option<PathBuf>,
    language: Option<&'static Language>,
    tab_stop: usize,
}

impl Buffer {
    /// An empty buffer (zero rows). The first insert creates row 0; an
    /// empty buffer is only observable before any editing happens.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            language: None,
            tab_stop,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn language(&self) -> Option<&'static Language> {
        self.language
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Length in chars of row `at`, zero when out of range.
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    // -- Filename / language ------------------------------------------------

    /// Set the filename and re-select the language, re-highlighting the
    /// whole buffer when the selection changes anything.
    pub fn set_filename(&mut self, name: impl Into<PathBuf>) {
        let name = name.into();
        self.language = name
            .to_str()
            .and_then(syntax::select_language);
        self.filename = Some(name);
        syntax::highlight_all(&mut self.rows, self.language);
    }

    /// Mark the buffer clean (after a successful save).
    pub const fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    // -- Structural edits ---------------------------------------------------

    /// Insert a row at `at` (clamped to the row count).
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(at, text));
        self.renumber(at);
        self.rows[at].render(self.tab_stop);
        syntax::highlight_from(&mut self.rows, at, self.language);
        self.dirty += 1;
    }

    /// Delete row `at`. Out of range is a no-op. When the last row goes,
    /// a single empty row is re-seeded immediately — the buffer is never
    /// empty once editing has begun.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.renumber(at);
        if self.rows.is_empty() {
            self.rows.push(Row::new(0, ""));
            self.rows[0].render(self.tab_stop);
        }
        let next = at.min(self.rows.len() - 1);
        syntax::highlight_from(&mut self.rows, next, self.language);
        self.dirty += 1;
    }

    /// Split row `cy` at column `cx`: the tail becomes a new row below.
    pub fn split_row(&mut self, cy: usize, cx: usize) {
        if cy >= self.rows.len() {
            // Splitting past the last row appends an empty one.
            self.insert_row(self.rows.len(), "");
            return;
        }
        let tail = self.rows[cy].split_off(cx);
        self.rows[cy].render(self.tab_stop);
        self.rows.insert(cy + 1, Row::new(cy + 1, tail));
        self.renumber(cy + 1);
        self.rows[cy + 1].render(self.tab_stop);
        syntax::highlight_from(&mut self.rows, cy, self.language);
        self.dirty += 1;
    }

    // -- Character edits ----------------------------------------------------

    /// Insert `ch` at (`cy`, `cx`). A `cy` one past the last row grows the
    /// buffer first, which is how typing into an empty buffer works.
    pub fn insert_char(&mut self, cy: usize, cx: usize, ch: char) {
        if cy == self.rows.len() {
            self.insert_row(self.rows.len(), "");
        }
        if cy >= self.rows.len() {
            return;
        }
        self.rows[cy].insert_char(cx, ch);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Delete the char before (`cy`, `cx`). At column 0 the row joins its
    /// predecessor. Row 0, column 0 is a no-op.
    ///
    /// Returns the cursor position after the deletion, or `None` when
    /// nothing happened.
    pub fn delete_char(&mut self, cy: usize, cx: usize) -> Option<(usize, usize)> {
        if cy >= self.rows.len() {
            return None;
        }
        if cx > 0 {
            self.rows[cy].delete_char(cx - 1);
            self.update_row(cy);
            self.dirty += 1;
            return Some((cy, cx - 1));
        }
        if cy == 0 {
            return None;
        }

        // Join with the previous row.
        let prev_len = self.rows[cy - 1].len();
        let tail = std::mem::take(&mut self.rows[cy].raw);
        self.rows[cy - 1].append(&tail);
        self.rows.remove(cy);
        self.renumber(cy);
        self.rows[cy - 1].render(self.tab_stop);
        syntax::highlight_from(&mut self.rows, cy - 1, self.language);
        self.dirty += 1;
        Some((cy - 1, prev_len))
    }

    /// Append text to the end of row `cy`. Out of range is a no-op.
    pub fn append_text(&mut self, cy: usize, text: &str) {
        if cy >= self.rows.len() {
            return;
        }
        self.rows[cy].append(text);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Truncate row `cy` to `at` chars. Out of range is a no-op.
    pub fn truncate_row(&mut self, cy: usize, at: usize) {
        if cy >= self.rows.len() {
            return;
        }
        self.rows[cy].truncate(at);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Delete chars `from..=to` of row `cy`, clamped to the row. Used by
    /// single-row selection deletes.
    pub fn delete_span(&mut self, cy: usize, from: usize, to: usize) {
        if cy >= self.rows.len() {
            return;
        }
        let len = self.rows[cy].len();
        if from >= len || from > to {
            return;
        }
        let to = to.min(len - 1);
        let mut kept: String = self.rows[cy].raw.chars().take(from).collect();
        kept.extend(self.rows[cy].raw.chars().skip(to + 1));
        self.rows[cy].raw = kept;
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Overwrite the char at (`cy`, `cx`). Out of range is a no-op.
    pub fn replace_char(&mut self, cy: usize, cx: usize, ch: char) {
        if cy >= self.rows.len() || cx >= self.rows[cy].len() {
            return;
        }
        self.rows[cy].delete_char(cx);
        self.rows[cy].insert_char(cx, ch);
        self.update_row(cy);
        self.dirty += 1;
    }

    // -- Whole-content import/export ----------------------------------------

    /// The full document as one string, one trailing newline per row.
    #[must_use]
    pub fn export_text(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&row.raw);
            out.push('\n');
        }
        out
    }

    /// Replace the whole content. Leaves the buffer clean — this is the
    /// load path, not an edit.
    pub fn import_text(&mut self, lines: Vec<String>) {
        self.rows = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| Row::new(i, line))
            .collect();
        for row in &mut self.rows {
            row.render(self.tab_stop);
        }
        syntax::highlight_all(&mut self.rows, self.language);
        self.dirty = 0;
    }

    /// Raw row contents, for an undo snapshot.
    #[must_use]
    pub fn snapshot_rows(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.raw.clone()).collect()
    }

    /// Replace the content from an undo snapshot. Unlike
    /// [`import_text`](Self::import_text) this counts as a mutation.
    pub fn restore_rows(&mut self, lines: Vec<String>) {
        self.rows = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| Row::new(i, line))
            .collect();
        for row in &mut self.rows {
            row.render(self.tab_stop);
        }
        syntax::highlight_all(&mut self.rows, self.language);
        self.dirty += 1;
    }

    // -- Highlight hooks ----------------------------------------------------

    /// Recompute the highlight of row `at` from its content, discarding any
    /// overlay tags (search matches).
    pub fn rehighlight_row(&mut self, at: usize) {
        if at < self.rows.len() {
            syntax::highlight_from(&mut self.rows, at, self.language);
        }
    }

    /// Paint `len` rendered cells of row `cy` with the search-match tag,
    /// starting at rendered column `from`. Clamped to the row.
    pub fn set_match_highlight(&mut self, cy: usize, from: usize, len: usize) {
        if let Some(row) = self.rows.get_mut(cy) {
            let end = (from + len).min(row.highlight.len());
            for tag in row.highlight.get_mut(from..end).unwrap_or_default() {
                *tag = crate::syntax::Highlight::Match;
            }
        }
    }

    // -- Internals ----------------------------------------------------------

    fn update_row(&mut self, cy: usize) {
        self.rows[cy].render(self.tab_stop);
        syntax::highlight_from(&mut self.rows, cy, self.language);
    }

    fn renumber(&mut self, from: usize) {
        for i in from..self.rows.len() {
            self.rows[i].index = i;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Highlight;
    use pretty_assertions::assert_eq;

    fn buffer_with(lines: &[&str]) -> Buffer {
        let mut buf = Buffer::new(8);
        buf.import_text(lines.iter().map(|s| (*s).to_string()).collect());
        buf
    }

    fn raw_lines(buf: &Buffer) -> Vec<&str> {
        buf.rows().iter().map(|r| r.raw.as_str()).collect()
    }

    // -- Structural edits ---------------------------------------------------

    #[test]
    fn insert_row_renumbers() {
        let mut buf = buffer_with(&["a", "c"]);
        buf.insert_row(1, "b");
        assert_eq!(raw_lines(&buf), vec!["a", "b", "c"]);
        for (i, row) in buf.rows().iter().enumerate() {
            assert_eq!(row.index, i);
        }
        assert!(buf.is_dirty());
    }

    #[test]
    fn delete_row_reseeds_the_last_one() {
        let mut buf = buffer_with(&["only"]);
        buf.delete_row(0);
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(buf.row(0).map(|r| r.raw.as_str()), Some(""));
    }

    #[test]
    fn delete_row_out_of_range_is_a_noop() {
        let mut buf = buffer_with(&["a"]);
        buf.delete_row(5);
        assert_eq!(buf.num_rows(), 1);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn split_row_moves_the_tail_down() {
        let mut buf = buffer_with(&["hello world"]);
        buf.split_row(0, 5);
        assert_eq!(raw_lines(&buf), vec!["hello", " world"]);
    }

    // -- Character edits ----------------------------------------------------

    #[test]
    fn insert_char_into_empty_buffer_creates_a_row() {
        let mut buf = Buffer::new(8);
        assert_eq!(buf.num_rows(), 0);
        buf.insert_char(0, 0, 'x');
        assert_eq!(raw_lines(&buf), vec!["x"]);
    }

    #[test]
    fn delete_char_mid_row() {
        let mut buf = buffer_with(&["abc"]);
        assert_eq!(buf.delete_char(0, 2), Some((0, 1)));
        assert_eq!(raw_lines(&buf), vec!["ac"]);
    }

    #[test]
    fn delete_char_at_column_zero_joins_rows() {
        let mut buf = buffer_with(&["ab", "cd"]);
        assert_eq!(buf.delete_char(1, 0), Some((0, 2)));
        assert_eq!(raw_lines(&buf), vec!["abcd"]);
    }

    #[test]
    fn delete_char_at_origin_is_a_noop() {
        let mut buf = buffer_with(&["ab"]);
        assert_eq!(buf.delete_char(0, 0), None);
        assert_eq!(raw_lines(&buf), vec!["ab"]);
    }

    #[test]
    fn delete_span_clamps_and_splices() {
        let mut buf = buffer_with(&["abcdef"]);
        buf.delete_span(0, 1, 3);
        assert_eq!(raw_lines(&buf), vec!["aef"]);
        buf.delete_span(0, 1, 99);
        assert_eq!(raw_lines(&buf), vec!["a"]);
        buf.delete_span(0, 5, 9); // past the end: no-op
        assert_eq!(raw_lines(&buf), vec!["a"]);
    }

    #[test]
    fn replace_char_overwrites_in_place() {
        let mut buf = buffer_with(&["abc"]);
        buf.replace_char(0, 1, 'X');
        assert_eq!(raw_lines(&buf), vec!["aXc"]);
        buf.replace_char(0, 9, 'Y');
        assert_eq!(raw_lines(&buf), vec!["aXc"]);
    }

    // -- Import/export ------------------------------------------------------

    #[test]
    fn export_appends_a_newline_per_row() {
        let buf = buffer_with(&["a", "b"]);
        assert_eq!(buf.export_text(), "a\nb\n");
    }

    #[test]
    fn import_is_clean_restore_is_dirty() {
        let mut buf = buffer_with(&["a"]);
        assert!(!buf.is_dirty());
        let snap = buf.snapshot_rows();
        buf.restore_rows(snap);
        assert!(buf.is_dirty());
    }

    #[test]
    fn snapshot_round_trip_is_byte_identical() {
        let mut buf = buffer_with(&["one", "two\tthree", ""]);
        let snap = buf.snapshot_rows();
        buf.insert_char(0, 0, 'x');
        buf.delete_row(2);
        buf.restore_rows(snap);
        assert_eq!(raw_lines(&buf), vec!["one", "two\tthree", ""]);
    }

    // -- Highlighting through the buffer ------------------------------------

    #[test]
    fn highlight_stays_sized_after_every_mutation() {
        let mut buf = buffer_with(&["int x;", "\t/* open", "text"]);
        buf.set_filename("t.c");
        buf.insert_char(0, 0, 'y');
        buf.split_row(0, 3);
        buf.delete_char(1, 0);
        buf.append_text(2, " */");
        for row in buf.rows() {
            assert_eq!(row.highlight.len(), row.rendered.chars().count());
        }
    }

    #[test]
    fn language_follows_the_filename() {
        let mut buf = buffer_with(&["return 1;"]);
        assert!(buf.language().is_none());
        buf.set_filename("main.c");
        assert_eq!(buf.language().map(|l| l.name), Some("c"));
        assert_eq!(buf.row(0).map(|r| r.highlight[0]), Some(Highlight::Keyword1));
    }

    #[test]
    fn closing_a_comment_reverts_rows_below() {
        let mut buf = buffer_with(&["/* a", "b", "c"]);
        buf.set_filename("t.c");
        assert!(buf.row(2).is_some_and(|r| r.open_comment));

        // Append the close on row 0; rows 1-2 leave the comment.
        buf.append_text(0, " */");
        assert!(buf.row(0).is_some_and(|r| !r.open_comment));
        assert!(buf.row(1).is_some_and(|r| !r.open_comment));
        assert_eq!(buf.row(1).map(|r| r.highlight[0]), Some(Highlight::Normal));
    }
}
