//! File load/save.
//!
//! Loading splits on line terminators (`\n` or `\r\n`) and never hands back
//! a terminator. A missing file is not an error — it is how "open a new
//! file" works — but any other I/O failure propagates.

use std::fs;
use std::io;
use std::path::Path;

/// Result of opening a path.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file exists; its lines, without terminators.
    Existing(Vec<String>),
    /// The path does not exist yet.
    NewFile,
}

/// Read a file into lines.
///
/// # Errors
///
/// Any I/O error other than "not found".
pub fn load(path: &Path) -> io::Result<LoadOutcome> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(LoadOutcome::Existing(
            text.lines().map(str::to_string).collect(),
        )),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LoadOutcome::NewFile),
        Err(err) => Err(err),
    }
}

/// Write the exported buffer text to `path`, returning the byte count.
///
/// # Errors
///
/// Any I/O error from creating or writing the file.
pub fn save(path: &Path, text: &str) -> io::Result<usize> {
    fs::write(path, text)?;
    Ok(text.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load(&dir.path().join("nope.txt")).unwrap();
        assert_eq!(outcome, LoadOutcome::NewFile);
    }

    #[test]
    fn save_reports_byte_count_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let written = save(&path, "one\ntwo\n").unwrap();
        assert_eq!(written, 8);
        let outcome = load(&path).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Existing(vec!["one".into(), "two".into()])
        );
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();
        let outcome = load(&path).unwrap();
        assert_eq!(outcome, LoadOutcome::Existing(vec!["a".into(), "b".into()]));
    }
}
