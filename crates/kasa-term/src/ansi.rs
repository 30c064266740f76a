// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — the frame renderer makes those calls.
// This module just knows the byte-level encoding of every terminal command
// we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to the frame buffer (a Vec).

use std::io::{self, Write};

// ─── Rgb ────────────────────────────────────────────────────────────────────

/// A 24-bit color, used for the terminal's default foreground/background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_packed(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// Parse a `#RRGGBB` or `RRGGBB` hex string.
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::from_packed)
    }
}

// ─── Cursor ─────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Enter the alternate screen buffer (DEC Private Mode 1049).
///
/// The alternate screen preserves the original terminal content; exiting
/// restores it, which is what makes the editor non-destructive.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── SGR attributes ─────────────────────────────────────────────────────────

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Reverse video on (SGR 7). Used for the status bar and visual selections.
#[inline]
pub fn reverse_on(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// Reverse video off (SGR 27).
#[inline]
pub fn reverse_off(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[27m")
}

/// Emit a raw SGR code (`ESC [ code m`).
///
/// The syntax colors are classic 30-37/90-97 codes; the renderer tracks the
/// last emitted code and only calls this when the color actually changes.
#[inline]
pub fn sgr(w: &mut impl Write, code: u8) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}

/// Reset the foreground to the terminal default (SGR 39).
#[inline]
pub fn fg_default(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[39m")
}

// ─── Default terminal colors ────────────────────────────────────────────────

/// Set the terminal's default foreground and background colors.
///
/// Two methods for compatibility: OSC 10/11 (honored by most modern
/// terminals) plus a 24-bit SGR background so terminals that ignore OSC 11
/// still paint cleared cells with the configured background.
pub fn set_default_colors(w: &mut impl Write, fg: Rgb, bg: Rgb) -> io::Result<()> {
    write!(w, "\x1b]10;#{:02x}{:02x}{:02x}\x07", fg.r, fg.g, fg.b)?;
    write!(w, "\x1b]11;#{:02x}{:02x}{:02x}\x07", bg.r, bg.g, bg.b)?;
    write!(w, "\x1b[48;2;{};{};{}m", bg.r, bg.g, bg.b)
}

/// Reset the terminal's default colors (OSC 110/111) and SGR fg/bg.
pub fn reset_default_colors(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[39m\x1b[49m")?;
    w.write_all(b"\x1b]110\x07\x1b]111\x07")
}

// ─── Tests ──────────────────────────────────────────────────────────────────
