//! A single line of text plus its derived display buffers.
//!
//! `raw` is the authoritative content. `rendered` is derived from it with
//! tabs expanded to the next multiple of the tab stop, and `highlight`
//! carries one classification per rendered character — the two derived
//! buffers always have the same length (in chars).
//!
//! Columns into `raw` count chars, not bytes; the helpers here do the
//! char→byte translation so the rest of the editor never touches byte
//! offsets. Rendered columns count terminal cells, so a double-width
//! character advances by two.

use unicode_width::UnicodeWidthChar;

use crate::syntax::Highlight;

/// One buffer row.
#[derive(Debug, Clone)]
pub struct Row {
    /// Position in the buffer. Kept consistent by `Buffer` after any
    /// structural change.
    pub index: usize,
    /// The literal line content, no trailing newline.
    pub raw: String,
    /// Tab-expanded copy of `raw` for display.
    pub rendered: String,
    /// One tag per `rendered` char. Same length as `rendered`, always.
    pub highlight: Vec<Highlight>,
    /// True if an unterminated block comment is still open at the end of
    /// this row.
    pub open_comment: bool,
}

impl Row {
    /// Create a row with empty derived buffers. The caller (always
    /// `Buffer`) renders and highlights it before it becomes visible.
    #[must_use]
    pub fn new(index: usize, raw: impl Into<String>) -> Self {
        Self {
            index,
            raw: raw.into(),
            rendered: String::new(),
            highlight: Vec::new(),
            open_comment: false,
        }
    }

    /// Length of the raw content in chars.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.chars().count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The char at column `cx`, if in range.
    #[must_use]
    pub fn char_at(&self, cx: usize) -> Option<char> {
        self.raw.chars().nth(cx)
    }

    /// Byte offset of char column `cx`; the raw length when past the end.
    fn byte_of(&self, cx: usize) -> usize {
        self.raw
            .char_indices()
            .nth(cx)
            .map_or(self.raw.len(), |(i, _)| i)
    }

    // -- Mutation (derived buffers go stale; Buffer re-renders) -------------

    /// Insert `ch` at char column `at`, clamped to the end.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let at = self.byte_of(at.min(self.len()));
        self.raw.insert(at, ch);
    }

    /// Delete the char at column `at`. Out of range is a no-op.
    pub fn delete_char(&mut self, at: usize) {
        if at < self.len() {
            let at = self.byte_of(at);
            self.raw.remove(at);
        }
    }

    /// Append text to the end of the row.
    pub fn append(&mut self, text: &str) {
        self.raw.push_str(text);
    }

    /// Split the row at char column `at`, keeping the head and returning
    /// the tail. `at` is clamped to the end.
    pub fn split_off(&mut self, at: usize) -> String {
        let at = self.byte_of(at.min(self.len()));
        self.raw.split_off(at)
    }

    /// Truncate the row to `at` chars.
    pub fn truncate(&mut self, at: usize) {
        let at = self.byte_of(at);
        self.raw.truncate(at);
    }

    // -- Rendering ----------------------------------------------------------

    /// Rebuild `rendered` from `raw`, expanding tabs to the next multiple
    /// of `tab_stop` (measured in cells from column 0). Resets `highlight`
    /// to all-Normal at the matching length; the syntax pass overwrites it.
    pub fn render(&mut self, tab_stop: usize) {
        self.rendered.clear();
        let mut width = 0usize;
        for ch in self.raw.chars() {
            if ch == '\t' {
                self.rendered.push(' ');
                width += 1;
                while width % tab_stop != 0 {
                    self.rendered.push(' ');
                    width += 1;
                }
            } else {
                self.rendered.push(ch);
                width += UnicodeWidthChar::width(ch).unwrap_or(1);
            }
        }
        let cells = self.rendered.chars().count();
        self.highlight.clear();
        self.highlight.resize(cells, Highlight::Normal);
    }

    /// Map a raw char column to a rendered cell column.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0usize;
        for ch in self.raw.chars().take(cx) {
            if ch == '\t' {
                rx += tab_stop - (rx % tab_stop);
            } else {
                rx += UnicodeWidthChar::width(ch).unwrap_or(1);
            }
        }
        rx
    }

    /// Map a rendered cell column back to a raw char column.
    ///
    /// Returns the column of the char occupying cell `rx`, or the row
    /// length if `rx` is past the end.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur = 0usize;
        for (cx, ch) in self.raw.chars().enumerate() {
            if ch == '\t' {
                cur += tab_stop - (cur % tab_stop);
            } else {
                cur += UnicodeWidthChar::width(ch).unwrap_or(1);
            }
            if cur > rx {
                return cx;
            }
        }
        self.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered_row(text: &str) -> Row {
        let mut row = Row::new(0, text);
        row.render(8);
        row
    }

    // -- Tab expansion ------------------------------------------------------

    #[test]
    fn lone_tab_renders_to_eight_spaces() {
        let row = rendered_row("\t");
        assert_eq!(row.rendered, "        ");
    }

    #[test]
    fn expansion_stays_a_multiple_of_eight() {
        // "a\tb": the tab pads column 1 out to column 8.
        let row = rendered_row("a\tb");
        assert_eq!(row.rendered, "a       b");

        // Inserting before the tab shifts the padding, not the stop.
        let mut row = rendered_row("a\tb");
        row.insert_char(0, 'x');
        row.render(8);
        assert_eq!(row.rendered, "xa      b");
        assert_eq!(row.rendered.len() - 1, 8); // 'b' still lands on a stop
    }

    #[test]
    fn highlight_matches_rendered_length() {
        for text in ["", "\t", "a\tb\tc", "plain", "wide：text"] {
            let row = rendered_row(text);
            assert_eq!(row.highlight.len(), row.rendered.chars().count());
        }
    }

    // -- Column mapping -----------------------------------------------------

    #[test]
    fn cx_to_rx_expands_tabs() {
        let row = rendered_row("a\tb");
        assert_eq!(row.cx_to_rx(0, 8), 0);
        assert_eq!(row.cx_to_rx(1, 8), 1);
        assert_eq!(row.cx_to_rx(2, 8), 8);
        assert_eq!(row.cx_to_rx(3, 8), 9);
    }

    #[test]
    fn rx_to_cx_inverts_the_mapping() {
        let row = rendered_row("a\tb");
        assert_eq!(row.rx_to_cx(0, 8), 0);
        assert_eq!(row.rx_to_cx(4, 8), 1); // anywhere inside the tab
        assert_eq!(row.rx_to_cx(8, 8), 2);
        assert_eq!(row.rx_to_cx(100, 8), 3); // past the end clamps
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let row = rendered_row("日本");
        assert_eq!(row.cx_to_rx(1, 8), 2);
        assert_eq!(row.cx_to_rx(2, 8), 4);
    }

    // -- Char-indexed mutation ----------------------------------------------

    #[test]
    fn insert_clamps_to_end() {
        let mut row = rendered_row("ab");
        row.insert_char(99, 'c');
        assert_eq!(row.raw, "abc");
    }

    #[test]
    fn delete_out_of_range_is_a_noop() {
        let mut row = rendered_row("ab");
        row.delete_char(5);
        assert_eq!(row.raw, "ab");
    }

    #[test]
    fn split_and_append_round_trip() {
        let mut row = rendered_row("hello world");
        let tail = row.split_off(5);
        assert_eq!(row.raw, "hello");
        assert_eq!(tail, " world");
        row.append(&tail);
        assert_eq!(row.raw, "hello world");
    }

    #[test]
    fn char_ops_handle_multibyte() {
        let mut row = rendered_row("café");
        assert_eq!(row.len(), 4);
        row.delete_char(3);
        assert_eq!(row.raw, "caf");
        row.insert_char(1, 'é');
        assert_eq!(row.raw, "céaf");
    }
}
