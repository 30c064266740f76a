//! Startup configuration.
//!
//! A flat `key=value` file, looked up as `./.kasarc` first and
//! `$HOME/.kasarc` second (first hit wins). Unknown keys and unparseable
//! values are ignored — a bad config line never stops the editor from
//! starting, it just keeps the default.

use std::fs;
use std::path::PathBuf;

use kasa_term::Rgb;

use crate::mode::Mode;

/// Line-number gutter style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumbers {
    Off,
    Absolute,
    /// Distance from the cursor row, with 1 on the cursor row itself.
    Relative,
}

/// Everything the editor reads at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tab_stop: usize,
    pub initial_mode: Mode,
    pub fg_color: Rgb,
    pub bg_color: Rgb,
    pub line_numbers: LineNumbers,
    pub max_undo_levels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            initial_mode: Mode::Normal,
            fg_color: Rgb::new(0xE0, 0xE0, 0xE0),
            bg_color: Rgb::new(0x1E, 0x1E, 0x1E),
            line_numbers: LineNumbers::Absolute,
            max_undo_levels: 100,
        }
    }
}

impl Config {
    /// Load from the usual locations, falling back to defaults when no
    /// config file exists.
    #[must_use]
    pub fn load() -> Self {
        let mut paths = vec![PathBuf::from(".kasarc")];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".kasarc"));
        }
        for path in paths {
            if let Ok(text) = fs::read_to_string(&path) {
                return Self::parse(&text);
            }
        }
        Self::default()
    }

    /// Parse a config file body on top of the defaults.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            config.apply(key.trim(), value.trim());
        }
        config
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "tab_stop" => {
                if let Ok(n) = value.parse::<usize>() {
                    if n > 0 {
                        self.tab_stop = n;
                    }
                }
            }
            "mode" => match value {
                "insert" => self.initial_mode = Mode::Insert,
                "normal" => self.initial_mode = Mode::Normal,
                _ => {}
            },
            "fg_color" => {
                if let Some(c) = Rgb::parse_hex(value) {
                    self.fg_color = c;
                }
            }
            "bg_color" => {
                if let Some(c) = Rgb::parse_hex(value) {
                    self.bg_color = c;
                }
            }
            "show_line_numbers" => match value {
                "0" => self.line_numbers = LineNumbers::Off,
                "1" => self.line_numbers = LineNumbers::Absolute,
                "2" => self.line_numbers = LineNumbers::Relative,
                _ => {}
            },
            "max_undo_levels" => {
                if let Ok(n) = value.parse::<usize>() {
                    if n > 0 {
                        self.max_undo_levels = n;
                    }
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.tab_stop, 8);
        assert_eq!(c.initial_mode, Mode::Normal);
        assert_eq!(c.fg_color, Rgb::new(0xE0, 0xE0, 0xE0));
        assert_eq!(c.bg_color, Rgb::new(0x1E, 0x1E, 0x1E));
        assert_eq!(c.line_numbers, LineNumbers::Absolute);
        assert_eq!(c.max_undo_levels, 100);
    }

    #[test]
    fn parses_every_key() {
        let c = Config::parse(
            "tab_stop=4\n\
             mode=insert\n\
             fg_color=#FFFFFF\n\
             bg_color=000000\n\
             show_line_numbers=2\n\
             max_undo_levels=50\n",
        );
        assert_eq!(c.tab_stop, 4);
        assert_eq!(c.initial_mode, Mode::Insert);
        assert_eq!(c.fg_color, Rgb::new(0xFF, 0xFF, 0xFF));
        assert_eq!(c.bg_color, Rgb::new(0, 0, 0));
        assert_eq!(c.line_numbers, LineNumbers::Relative);
        assert_eq!(c.max_undo_levels, 50);
    }

    #[test]
    fn unknown_keys_and_garbage_are_ignored() {
        let c = Config::parse(
            "no_such_key=1\n\
             just a line without equals\n\
             tab_stop=banana\n\
             tab_stop=0\n\
             show_line_numbers=9\n",
        );
        assert_eq!(c, Config::default());
    }

    #[test]
    fn whitespace_around_keys_is_tolerated() {
        let c = Config::parse("  tab_stop = 2  \n");
        assert_eq!(c.tab_stop, 2);
    }
}
