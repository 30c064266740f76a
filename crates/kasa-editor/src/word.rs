//! Word motions.
//!
//! Words are runs of non-separator characters; the separator class is the
//! same one keyword highlighting uses ([`crate::syntax::is_separator`]).
//! Forward motion skips the rest of the current token and any separators
//! after it; backward motion mirrors that. Both may cross a row boundary,
//! landing at column 0 of the next row or the end of the previous one.

use crate::buffer::Buffer;
use crate::syntax::is_separator;

/// `w`: the start of the next word. Returns the new (cx, cy).
#[must_use]
pub fn next_word(buf: &Buffer, cx: usize, cy: usize) -> (usize, usize) {
    let Some(row) = buf.row(cy) else {
        return (cx, cy);
    };
    let chars: Vec<char> = row.raw.chars().collect();
    let mut cx = cx;
    while cx < chars.len() && !is_separator(chars[cx]) {
        cx += 1;
    }
    while cx < chars.len() && is_separator(chars[cx]) {
        cx += 1;
    }
    if cx >= chars.len() && cy + 1 < buf.num_rows() {
        return (0, cy + 1);
    }
    (cx, cy)
}

/// `b`: the start of the previous word. Returns the new (cx, cy).
#[must_use]
pub fn prev_word(buf: &Buffer, cx: usize, cy: usize) -> (usize, usize) {
    if cx == 0 {
        if cy > 0 {
            return (buf.row_len(cy - 1), cy - 1);
        }
        return (0, 0);
    }
    let Some(row) = buf.row(cy) else {
        return (cx, cy);
    };
    let chars: Vec<char> = row.raw.chars().collect();
    let mut cx = cx.min(chars.len());
    while cx > 0 && is_separator(chars[cx - 1]) {
        cx -= 1;
    }
    while cx > 0 && !is_separator(chars[cx - 1]) {
        cx -= 1;
    }
    (cx, cy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
