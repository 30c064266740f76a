// SPDX-License-Identifier: MIT
//
// Key decoding — raw stdin bytes to logical keys.
//
// The grammar is deliberately small: printable bytes and control bytes map
// one-to-one, and a fixed set of two/three-byte escape sequences covers the
// navigation keys every terminal emits (CSI arrows, tilde-terminated editing
// keys, SS3 Home/End). Anything after ESC that we don't recognize degrades
// to a bare Escape key — a wrong-but-harmless answer beats swallowing input.
//
// The functions here are pure so the grammar is testable without a TTY; the
// blocking read loop that feeds them lives in `terminal.rs`.

/// One decoded logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (including `'\t'` and multi-byte UTF-8 input).
    Char(char),
    /// Ctrl plus a letter, normalized to lowercase (`Ctrl('r')` for 0x12).
    Ctrl(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Synthesized when a terminal resize was observed instead of input.
    Resize,
}

/// Decode a single non-ESC byte.
///
/// Control bytes 0x01..=0x1A map to `Ctrl(letter)` except Tab and the two
/// line terminators, which the editor treats as keys in their own right.
#[must_use]
pub fn decode_byte(b: u8) -> Key {
    match b {
        b'\r' | b'\n' => Key::Enter,
        b'\t' => Key::Char('\t'),
        0x7F | 0x08 => Key::Backspace,
        0x1B => Key::Escape,
        c @ 0x01..=0x1A => Key::Ctrl((c + b'a' - 1) as char),
        c => Key::Char(c as char),
    }
}

/// Decode the bytes that followed an ESC.
///
/// `seq` holds everything read after the 0x1B byte. Recognized:
///
/// - `[A`..`[D` — arrows; `[H`/`[F` — Home/End
/// - `[1~` `[7~` — Home; `[4~` `[8~` — End; `[3~` — Delete; `[5~`/`[6~` — PageUp/Down
/// - `OH`/`OF` — SS3 Home/End
///
/// Everything else is a bare Escape.
#[must_use]
pub fn decode_escape(seq: &[u8]) -> Key {
    match seq {
        [b'[', b'A', ..] => Key::Up,
        [b'[', b'B', ..] => Key::Down,
        [b'[', b'C', ..] => Key::Right,
        [b'[', b'D', ..] => Key::Left,
        [b'[', b'H', ..] | [b'[', b'1', b'~'] | [b'[', b'7', b'~'] | [b'O', b'H'] => Key::Home,
        [b'[', b'F', ..] | [b'[', b'4', b'~'] | [b'[', b'8', b'~'] | [b'O', b'F'] => Key::End,
        [b'[', b'3', b'~'] => Key::Delete,
        [b'[', b'5', b'~'] => Key::PageUp,
        [b'[', b'6', b'~'] => Key::PageDown,
        _ => Key::Escape,
    }
}

/// How many continuation bytes a UTF-8 lead byte announces, if it is one.
#[must_use]
pub const fn utf8_continuation_len(lead: u8) -> Option<usize> {
    match lead {
        0xC0..=0xDF => Some(1),
        0xE0..=0xEF => Some(2),
        0xF0..=0xF7 => Some(3),
        _ => None,
    }
}

/// Parse a cursor-position report: `ESC [ rows ; cols R`.
///
/// Used as the window-size fallback when `TIOCGWINSZ` is unavailable: the
/// cursor is first driven to the bottom-right corner, then queried.
/// `buf` holds the full reply including the leading ESC.
#[must_use]
pub fn parse_cursor_report(buf: &[u8]) -> Option<(u16, u16)> {
    let rest = buf.strip_prefix(b"\x1b[")?;
    let rest = rest.strip_suffix(b"R").unwrap_or(rest);
    let text = std::str::from_utf8(rest).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Single bytes ──────────────────────────────────────────────────

    #[test]
    fn printable_bytes() {
        assert_eq!(decode_byte(b'a'), Key::Char('a'));
        assert_eq!(decode_byte(b'Z'), Key::Char('Z'));
        assert_eq!(decode_byte(b' '), Key::Char(' '));
        assert_eq!(decode_byte(b'$'), Key::Char('$'));
    }

    #[test]
    fn enter_from_cr_and_lf() {
        assert_eq!(decode_byte(b'\r'), Key::Enter);
        assert_eq!(decode_byte(b'\n'), Key::Enter);
    }

    #[test]
    fn tab_is_a_character() {
        assert_eq!(decode_byte(b'\t'), Key::Char('\t'));
    }

    #[test]
    fn backspace_variants() {
        assert_eq!(decode_byte(0x7F), Key::Backspace);
        assert_eq!(decode_byte(0x08), Key::Backspace);
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(decode_byte(0x12), Key::Ctrl('r'));
        assert_eq!(decode_byte(0x06), Key::Ctrl('f'));
        assert_eq!(decode_byte(0x02), Key::Ctrl('b'));
        assert_eq!(decode_byte(0x11), Key::Ctrl('q'));
    }

    #[test]
    fn bare_escape_byte() {
        assert_eq!(decode_byte(0x1B), Key::Escape);
    }

    // ── Escape sequences ──────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(decode_escape(b"[A"), Key::Up);
        assert_eq!(decode_escape(b"[B"), Key::Down);
        assert_eq!(decode_escape(b"[C"), Key::Right);
        assert_eq!(decode_escape(b"[D"), Key::Left);
    }

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(decode_escape(b"[1~"), Key::Home);
        assert_eq!(decode_escape(b"[3~"), Key::Delete);
        assert_eq!(decode_escape(b"[4~"), Key::End);
        assert_eq!(decode_escape(b"[5~"), Key::PageUp);
        assert_eq!(decode_escape(b"[6~"), Key::PageDown);
        assert_eq!(decode_escape(b"[7~"), Key::Home);
        assert_eq!(decode_escape(b"[8~"), Key::End);
    }

    #[test]
    fn letter_home_end() {
        assert_eq!(decode_escape(b"[H"), Key::Home);
        assert_eq!(decode_escape(b"[F"), Key::End);
    }

    #[test]
    fn ss3_home_end() {
        assert_eq!(decode_escape(b"OH"), Key::Home);
        assert_eq!(decode_escape(b"OF"), Key::End);
    }

    #[test]
    fn unknown_sequences_degrade_to_escape() {
        assert_eq!(decode_escape(b"[Z"), Key::Escape);
        assert_eq!(decode_escape(b"[9~"), Key::Escape);
        assert_eq!(decode_escape(b"Ox"), Key::Escape);
        assert_eq!(decode_escape(b"q"), Key::Escape);
        assert_eq!(decode_escape(b""), Key::Escape);
    }

    // ── UTF-8 lead bytes ──────────────────────────────────────────────

    #[test]
    fn utf8_lead_lengths() {
        assert_eq!(utf8_continuation_len(0xC3), Some(1)); // é
        assert_eq!(utf8_continuation_len(0xE3), Some(2)); // kana
        assert_eq!(utf8_continuation_len(0xF0), Some(3)); // emoji
        assert_eq!(utf8_continuation_len(b'a'), None);
        assert_eq!(utf8_continuation_len(0x80), None); // bare continuation
    }

    // ── Cursor position report ────────────────────────────────────────

    #[test]
    fn cursor_report_parses() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80R"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"\x1b[1;1R"), Some((1, 1)));
    }

    #[test]
    fn cursor_report_rejects_garbage() {
        assert_eq!(parse_cursor_report(b"24;80R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[a;bR"), None);
        assert_eq!(parse_cursor_report(b""), None);
    }
}
