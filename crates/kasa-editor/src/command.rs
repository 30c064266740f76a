//! Colon-command parsing.
//!
//! The prompt hands the typed line here; execution lives in the editor,
//! which owns the state the commands act on. A leading digit means a line
//! jump; everything else is matched literally.

/// One parsed colon command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:<number>` — jump to a 1-indexed line (clamped by the executor).
    Jump(usize),
    /// `:w` / `:write`
    Write,
    /// `:q` / `:quit` — refused while dirty (unless the file never hit disk).
    Quit,
    /// `:q!`
    ForceQuit,
    /// `:wq` / `:x`
    WriteQuit,
    /// `:help` / `:h`
    Help,
    Unknown(String),
}

/// Status-line hint shown for `:help`.
pub const HELP_HINT: &str =
    "Commands: :w :q :q! :wq :<num> :help | Keys: i v V / u ^R dd yy p P tt bb ^F ^B 0 $ w b J r";

/// Parse one prompt line (without the leading `:`).
#[must_use]
pub fn parse(input: &str) -> Command {
    if input.starts_with(|c: char| c.is_ascii_digit()) {
        let digits: String = input.chars().take_while(char::is_ascii_digit).collect();
        let line = digits.parse::<usize>().unwrap_or(1).max(1);
        return Command::Jump(line);
    }

    match input {
        "w" | "write" => Command::Write,
        "q" | "quit" => Command::Quit,
        "q!" => Command::ForceQuit,
        "wq" | "x" => Command::WriteQuit,
        "help" | "h" => Command::Help,
        other => Command::Unknown(other.to_string()),
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
    fn named_commands() {
        assert_eq!(parse("w"), Command::Write);
        assert_eq!(parse("write"), Command::Write);
        assert_eq!(parse("q"), Command::Quit);
        assert_eq!(parse("quit"), Command::Quit);
        assert_eq!(parse("q!"), Command::ForceQuit);
        assert_eq!(parse("wq"), Command::WriteQuit);
        assert_eq!(parse("x"), Command::WriteQuit);
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("h"), Command::Help);
    }

    #[test]
    fn line_jumps() {
        assert_eq!(parse("42"), Command::Jump(42));
        assert_eq!(parse("0"), Command::Jump(1)); // clamped up
        assert_eq!(parse("12abc"), Command::Jump(12)); // trailing junk ignored
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(parse("frobnicate"), Command::Unknown("frobnicate".into()));
        assert_eq!(parse(""), Command::Unknown(String::new()));
        assert_eq!(parse("w x"), Command::Unknown("w x".into()));
    }
}
