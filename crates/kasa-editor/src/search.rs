//! Incremental search.
//!
//! A [`SearchSession`] lives for the duration of one `/` prompt. Every
//! keystroke re-runs the search from the last hit; arrow keys step to the
//! next or previous match, and cancelling restores the cursor and scroll
//! saved at session start.
//!
//! Queries are regular expressions; a query that fails to compile is
//! demoted to a literal substring, so typing `(` mid-pattern never kills
//! the search. Matching runs over the rendered row text (what the user
//! sees), and the hit is painted with the Match tag until the next
//! keystroke clears it.

use regex::Regex;

use crate::buffer::Buffer;

enum Matcher {
    Pattern(Regex),
    Literal(String),
}

impl Matcher {
    fn new(query: &str) -> Self {
        Regex::new(query).map_or_else(|_| Self::Literal(query.to_string()), Self::Pattern)
    }

    /// Byte range of the first hit in `text`.
    fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Self::Pattern(re) => re.find(text).map(|m| (m.start(), m.end())),
            Self::Literal(lit) => text.find(lit.as_str()).map(|i| (i, i + lit.len())),
        }
    }
}

/// One interactive search, holding the state to step between matches and
/// to back out cleanly on cancel.
#[derive(Debug)]
pub struct SearchSession {
    saved_cx: usize,
    saved_cy: usize,
    saved_rowoff: usize,
    saved_coloff: usize,
    last_match: Option<usize>,
    forward: bool,
}

impl SearchSession {
    #[must_use]
    pub const fn new(cx: usize, cy: usize, rowoff: usize, coloff: usize) -> Self {
        Self {
            saved_cx: cx,
            saved_cy: cy,
            saved_rowoff: rowoff,
            saved_coloff: coloff,
            last_match: None,
            forward: true,
        }
    }

    /// The cursor and scroll offsets captured at session start, restored
    /// when the search is cancelled.
    #[must_use]
    pub const fn saved(&self) -> (usize, usize, usize, usize) {
        (
            self.saved_cx,
            self.saved_cy,
            self.saved_rowoff,
            self.saved_coloff,
        )
    }

    /// Step direction for the next [`find`](Self::find).
    pub const fn set_direction(&mut self, forward: bool) {
        self.forward = forward;
    }

    /// Forget the match chain; the next find starts from the top (or
    /// bottom, when searching backward). Called when the query changes.
    pub const fn restart(&mut self) {
        self.last_match = None;
        self.forward = true;
    }

    /// Remove the Match overlay left by the previous hit.
    pub fn clear_match_highlight(&self, buf: &mut Buffer) {
        if let Some(row) = self.last_match {
            buf.rehighlight_row(row);
        }
    }

    /// Find the next hit and paint it. Returns the cursor position
    /// (cx, cy) of the match, or `None` when nothing in the buffer
    /// matches.
    pub fn find(&mut self, buf: &mut Buffer, query: &str) -> Option<(usize, usize)> {
        if query.is_empty() || buf.num_rows() == 0 {
            return None;
        }
        let matcher = Matcher::new(query);
        let n = buf.num_rows();

        let mut current = self.last_match;
        for _ in 0..n {
            current = Some(match current {
                None => {
                    if self.forward {
                        0
                    } else {
                        n - 1
                    }
                }
                Some(c) => {
                    if self.forward {
                        (c + 1) % n
                    } else {
                        (c + n - 1) % n
                    }
                }
            });
            let row_idx = current.unwrap_or(0);
            let Some(row) = buf.row(row_idx) else { break };

            if let Some((start, end)) = matcher.find(&row.rendered) {
                let rx = row.rendered[..start].chars().count();
                let len = row.rendered[start..end].chars().count();
                let cx = row.rx_to_cx(rx, buf.tab_stop());

                self.last_match = Some(row_idx);
                buf.set_match_highlight(row_idx, rx, len);
                return Some((cx, row_idx));
            }
        }
        None
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

    #[test]
    fn finds_and_advances_with_wraparound() {
        let mut buf = buffer_with(&["alpha", "beta", "alpine"]);
        let mut session = SearchSession::new(0, 0, 0, 0);

        assert_eq!(session.find(&mut buf, "alp"), Some((0, 0)));
        session.set_direction(true);
        assert_eq!(session.find(&mut buf, "alp"), Some((0, 2)));
        // Wraps back to the first hit.
        assert_eq!(session.find(&mut buf, "alp"), Some((0, 0)));
    }

    #[test]
    fn backward_stepping() {
        let mut buf = buffer_with(&["x", "hit", "y", "hit"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        session.set_direction(false);
        assert_eq!(session.find(&mut buf, "hit"), Some((0, 3)));
        assert_eq!(session.find(&mut buf, "hit"), Some((0, 1)));
    }

    #[test]
    fn match_is_painted_and_clearable() {
        let mut buf = buffer_with(&["say hello twice"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        session.find(&mut buf, "hello").unwrap();

        let hl = &buf.row(0).unwrap().highlight;
        assert_eq!(hl[4], Highlight::Match);
        assert_eq!(hl[8], Highlight::Match);
        assert_eq!(hl[3], Highlight::Normal);

        session.clear_match_highlight(&mut buf);
        assert!(buf.row(0).unwrap().highlight.iter().all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn regex_queries_work() {
        let mut buf = buffer_with(&["abc", "a1c", "azc"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        assert_eq!(session.find(&mut buf, "a[0-9]c"), Some((0, 1)));
    }

    #[test]
    fn broken_regex_degrades_to_literal() {
        let mut buf = buffer_with(&["f(x", "plain"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        assert_eq!(session.find(&mut buf, "f("), Some((0, 0)));
    }

    #[test]
    fn tab_expansion_maps_back_to_char_columns() {
        let mut buf = buffer_with(&["\tword"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        // "word" starts at rendered col 8 but char col 1.
        assert_eq!(session.find(&mut buf, "word"), Some((1, 0)));
    }

    #[test]
    fn no_match_returns_none() {
        let mut buf = buffer_with(&["abc"]);
        let mut session = SearchSession::new(2, 0, 1, 3);
        assert_eq!(session.find(&mut buf, "zzz"), None);
        assert_eq!(session.saved(), (2, 0, 1, 3));
    }

    #[test]
    fn restart_searches_from_the_top_again() {
        let mut buf = buffer_with(&["hit", "hit"]);
        let mut session = SearchSession::new(0, 0, 0, 0);
        assert_eq!(session.find(&mut buf, "hit"), Some((0, 0)));
        assert_eq!(session.find(&mut buf, "hit"), Some((0, 1)));
        session.restart();
        assert_eq!(session.find(&mut buf, "hit"), Some((0, 0)));
    }
}
