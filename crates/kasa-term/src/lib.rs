// SPDX-License-Identifier: MIT
//
// kasa-term — Terminal layer for kasa.
//
// Direct terminal control via ANSI escape sequences and raw termios. No
// TUI framework, no curses: the editor owns every byte it sends. The
// layer splits into three small modules:
//
// - `ansi` — pure escape-sequence writers (cursor, screen, SGR, OSC)
// - `key` — pure byte-to-key decoding, testable without a TTY
// - `terminal` — the stateful part: raw mode, alternate screen, blocking
//   key reads with a resize-aware timeout, and RAII cleanup that survives
//   panics
//
// Everything above this crate deals in `Key` values and `Size` cells;
// nothing above it ever touches an escape code or a file descriptor.

pub mod ansi;
pub mod key;
pub mod terminal;

pub use ansi::Rgb;
pub use key::Key;
pub use terminal::{Size, Terminal};
