//! Modal editing states.
//!
//! The editor is always in exactly one [`Mode`]. Normal interprets keys as
//! commands, Insert feeds them into the buffer, and the two visual modes
//! extend a selection anchored where the mode was entered. The anchor itself
//! lives in the selection model, not here — `Mode` is pure data.

use std::fmt;

/// The current editing mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands, not text input.
    #[default]
    Normal,
    /// Keys produce characters in the buffer.
    Insert,
    /// `v` — character-wise selection; movement extends it.
    Visual,
    /// `V` — line-wise selection; whole rows are covered.
    VisualLine,
}

impl Mode {
    /// Human-readable name for the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
            Self::VisualLine => "VISUAL LINE",
        }
    }

    /// True in either visual sub-mode.
    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual | Self::VisualLine)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.display_name(), "NORMAL");
        assert_eq!(Mode::Insert.display_name(), "INSERT");
        assert_eq!(Mode::Visual.display_name(), "VISUAL");
        assert_eq!(Mode::VisualLine.display_name(), "VISUAL LINE");
    }

    #[test]
    fn visual_predicate() {
        assert!(Mode::Visual.is_visual());
        assert!(Mode::VisualLine.is_visual());
        assert!(!Mode::Normal.is_visual());
        assert!(!Mode::Insert.is_visual());
    }
}
