//! The editor state aggregate and its modal key dispatch.
//!
//! One [`Editor`] owns everything the main loop mutates: buffer, cursor,
//! scroll offsets, mode, selection anchor, yank buffer, undo engine, and
//! the transient status message. Keys arrive already decoded; the editor
//! dispatches them by mode and hands back an [`Action`] when the main loop
//! has to open a prompt (`:` and `/` read a line of input, which the
//! renderer owns).
//!
//! Every edit path runs the undo block protocol before touching the
//! buffer: contiguous typing coalesces, while commands like paste, join,
//! and visual delete each form exactly one undo step.

use std::time::{Duration, Instant};

use kasa_term::Key;

use crate::buffer::Buffer;
use crate::command::{self, Command};
use crate::config::{Config, LineNumbers};
use crate::file::{self, LoadOutcome};
use crate::mode::Mode;
use crate::position::Position;
use crate::selection::{self, Selection};
use crate::undo::{Snapshot, UndoEngine};
use crate::word;

/// How long a status message stays visible.
const MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Width of the line-number gutter when enabled (3 digits plus a space).
pub const GUTTER_WIDTH: usize = 4;

/// What the main loop must do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Open the `:` prompt.
    OpenCommand,
    /// Open the `/` incremental-search prompt.
    OpenSearch,
}

/// Outcome of executing a colon command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
    /// A save was requested but no filename is set; the caller prompts for
    /// one and finishes via [`Editor::save_as`].
    NeedsFilename { then_quit: bool },
}

/// A keystroke held over to complete a two-key sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    /// First key of a chord (`dd`, `yy`, `tt`, `bb`).
    Chord(char),
    /// `r` was pressed; the next key is the replacement character.
    Replace,
}

#[derive(Debug)]
struct StatusMessage {
    text: String,
    since: Instant,
}

/// The single owned editor state, threaded by exclusive reference through
/// the call graph.
#[derive(Debug)]
pub struct Editor {
    pub buffer: Buffer,
    /// Cursor char column into the current row's raw text.
    pub cx: usize,
    /// Cursor row.
    pub cy: usize,
    /// Cursor rendered column; derived by [`scroll`](Self::scroll) each
    /// frame, never authoritative.
    pub rx: usize,
    pub rowoff: usize,
    pub coloff: usize,
    pub mode: Mode,
    pub selection: Option<Selection>,
    pub yank: Option<String>,
    pub undo: UndoEngine,
    pub line_numbers: LineNumbers,
    /// Text-area height (terminal rows minus the two footer lines).
    pub screen_rows: usize,
    pub screen_cols: usize,
    pending: Pending,
    message: Option<StatusMessage>,
}

impl Editor {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            buffer: Buffer::new(config.tab_stop),
            cx: 0,
            cy: 0,
            rx: 0,
            rowoff: 0,
            coloff: 0,
            mode: config.initial_mode,
            selection: None,
            yank: None,
            undo: UndoEngine::new(config.max_undo_levels),
            line_numbers: config.line_numbers,
            screen_rows: 22,
            screen_cols: 80,
            pending: Pending::None,
            message: None,
        }
    }

    /// Open a file into the buffer. A missing file seeds one empty row and
    /// stays clean (a new file); other I/O errors propagate.
    ///
    /// # Errors
    ///
    /// Any I/O error other than "not found".
    pub fn open(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        self.buffer.set_filename(path);
        match file::load(path)? {
            LoadOutcome::Existing(lines) => self.buffer.import_text(lines),
            LoadOutcome::NewFile => {
                self.buffer.import_text(vec![String::new()]);
                self.set_status(format!("New file: {}", path.display()));
            }
        }
        Ok(())
    }

    /// Update the viewport from the full terminal size. The text area loses
    /// two rows to the status and message bars.
    pub const fn set_viewport(&mut self, term_rows: usize, term_cols: usize) {
        self.screen_rows = term_rows.saturating_sub(2);
        self.screen_cols = term_cols;
    }

    // -- Status messages ----------------------------------------------------

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            since: Instant::now(),
        });
    }

    /// The current status message, if it hasn't expired.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| m.since.elapsed() < MESSAGE_TTL)
            .map(|m| m.text.as_str())
    }

    // -- Mode transitions ---------------------------------------------------

    pub fn set_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Visual => {
                self.selection = Some(Selection::new(Position::new(self.cy, self.cx), false));
            }
            Mode::VisualLine => {
                self.selection = Some(Selection::new(Position::new(self.cy, 0), true));
            }
            Mode::Normal | Mode::Insert => self.selection = None,
        }
        self.mode = mode;
        self.set_status(format!("-- {} --", mode.display_name()));
    }

    // -- Scrolling ----------------------------------------------------------

    /// The gutter width in cells, zero when line numbers are off.
    #[must_use]
    pub const fn gutter_width(&self) -> usize {
        match self.line_numbers {
            LineNumbers::Off => 0,
            LineNumbers::Absolute | LineNumbers::Relative => GUTTER_WIDTH,
        }
    }

    /// Recompute `rx` and clamp the scroll offsets so the cursor stays
    /// visible. Minimal adjustment: offsets only move when the cursor
    /// would otherwise leave the viewport.
    pub fn scroll(&mut self) {
        self.rx = self
            .buffer
            .row(self.cy)
            .map_or(0, |row| row.cx_to_rx(self.cx, self.buffer.tab_stop()));

        // A degenerate viewport (status bars eating every row, or a gutter
        // wider than the terminal) still scrolls as a one-cell window, so
        // the offsets never overtake the cursor.
        let rows = self.screen_rows.max(1);
        let text_cols = self.screen_cols.saturating_sub(self.gutter_width()).max(1);

        if self.cy < self.rowoff {
            self.rowoff = self.cy;
        }
        if self.cy >= self.rowoff + rows {
            self.rowoff = self.cy + 1 - rows;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        if self.rx >= self.coloff + text_cols {
            self.coloff = self.rx + 1 - text_cols;
        }
    }

    // -- Key dispatch -------------------------------------------------------

    /// Handle one decoded key in the current mode.
    pub fn handle_key(&mut self, key: Key) -> Action {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Insert => {
                self.handle_insert_key(key);
                Action::None
            }
            Mode::Visual | Mode::VisualLine => {
                self.handle_visual_key(key);
                Action::None
            }
        }
    }

    fn handle_normal_key(&mut self, key: Key) -> Action {
        // A pending `r` consumes the next key as the replacement.
        if self.pending == Pending::Replace {
            self.pending = Pending::None;
            if let Key::Char(c) = key {
                self.replace_char_at_cursor(c);
            }
            return Action::None;
        }

        let chord = match self.pending {
            Pending::Chord(c) => Some(c),
            _ => None,
        };
        self.pending = Pending::None;

        match key {
            Key::Char('i') => self.set_mode(Mode::Insert),
            Key::Char('v') => self.set_mode(Mode::Visual),
            Key::Char('V') => self.set_mode(Mode::VisualLine),
            Key::Char('u') => self.undo(),
            Key::Ctrl('r') => self.redo(),

            Key::Char('y') => {
                if chord == Some('y') {
                    self.yank_line();
                } else {
                    self.pending = Pending::Chord('y');
                }
            }
            Key::Char('d') => {
                if chord == Some('d') {
                    self.delete_line();
                } else {
                    self.pending = Pending::Chord('d');
                }
            }
            Key::Char('t') => {
                if chord == Some('t') {
                    self.cy = 0;
                } else {
                    self.pending = Pending::Chord('t');
                }
            }
            Key::Char('b') => {
                if chord == Some('b') {
                    self.cy = self.buffer.num_rows().saturating_sub(1);
                } else {
                    // First press is already a motion; a second completes
                    // the jump-to-bottom chord.
                    let (cx, cy) = word::prev_word(&self.buffer, self.cx, self.cy);
                    self.cx = cx;
                    self.cy = cy;
                    self.pending = Pending::Chord('b');
                }
            }

            Key::Char('r') => self.pending = Pending::Replace,
            Key::Char('J') => self.join_lines(),
            Key::Char('w') => {
                let (cx, cy) = word::next_word(&self.buffer, self.cx, self.cy);
                self.cx = cx;
                self.cy = cy;
            }
            Key::Char('0') => self.cx = 0,
            Key::Char('$') => self.cx = self.buffer.row_len(self.cy),

            Key::Char('p') => self.paste(true),
            Key::Char('P') => self.paste(false),

            Key::Char('q') => self.set_status("Use :q or :wq to quit/save"),
            Key::Char(':') => return Action::OpenCommand,
            Key::Char('/') => return Action::OpenSearch,

            Key::Char('h' | 'j' | 'k' | 'l')
            | Key::Left
            | Key::Right
            | Key::Up
            | Key::Down
            | Key::Home
            | Key::End => self.move_cursor(key),

            Key::Ctrl('f') | Key::PageDown => self.page_forward(),
            Key::Ctrl('b') | Key::PageUp => self.page_backward(),

            _ => {}
        }
        Action::None
    }

    fn handle_insert_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.insert_newline(),
            Key::Backspace | Key::Ctrl('h') => self.delete_char(),
            Key::Delete => {
                self.move_cursor(Key::Right);
                self.delete_char();
            }
            Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End => {
                self.move_cursor(key);
            }
            Key::Ctrl('q') => self.set_status("Use :q in normal mode to quit."),
            Key::Escape => {
                self.undo.end_block();
                self.set_mode(Mode::Normal);
            }
            Key::Char(c) => self.insert_char(c),
            _ => {}
        }
    }

    fn handle_visual_key(&mut self, key: Key) {
        match key {
            Key::Escape => self.set_mode(Mode::Normal),
            Key::Char('j' | 'k') | Key::Up | Key::Down => self.move_cursor(key),
            // Horizontal movement only extends a character-wise selection.
            Key::Char('h' | 'l') | Key::Left | Key::Right => {
                if self.mode == Mode::Visual {
                    self.move_cursor(key);
                }
            }
            Key::Char('d' | 'x') => {
                self.delete_selection();
                self.set_mode(Mode::Normal);
            }
            Key::Char('y') => {
                self.yank_selection();
                self.set_mode(Mode::Normal);
            }
            Key::Char('c') => {
                self.delete_selection();
                self.set_mode(Mode::Insert);
            }
            _ => {}
        }
    }

    // -- Movement -----------------------------------------------------------

    fn move_cursor(&mut self, key: Key) {
        let row_len = self.buffer.row_len(self.cy);
        match key {
            Key::Left | Key::Char('h') => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.buffer.row_len(self.cy);
                }
            }
            Key::Right | Key::Char('l') => {
                if self.cy < self.buffer.num_rows() {
                    if self.cx < row_len {
                        self.cx += 1;
                    } else if self.cy + 1 < self.buffer.num_rows() {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::Up | Key::Char('k') => {
                self.cy = self.cy.saturating_sub(1);
            }
            Key::Down | Key::Char('j') => {
                if self.cy + 1 < self.buffer.num_rows() {
                    self.cy += 1;
                }
            }
            Key::Home => self.cx = 0,
            Key::End => self.cx = self.buffer.row_len(self.cy),
            _ => {}
        }

        // Snap to the (possibly shorter) row we landed on.
        let row_len = self.buffer.row_len(self.cy);
        if self.cx > row_len {
            self.cx = row_len;
        }
    }

    fn page_forward(&mut self) {
        self.rowoff += self.screen_rows;
        let max = self.buffer.num_rows().saturating_sub(self.screen_rows);
        if self.rowoff > max {
            self.rowoff = max;
        }
        self.cy = self.rowoff.min(self.buffer.num_rows().saturating_sub(1));
        self.clamp_cursor();
    }

    fn page_backward(&mut self) {
        self.rowoff = self.rowoff.saturating_sub(self.screen_rows);
        self.cy = self.rowoff;
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        if self.cy >= self.buffer.num_rows() {
            self.cy = self.buffer.num_rows().saturating_sub(1);
        }
        let len = self.buffer.row_len(self.cy);
        if self.cx > len {
            self.cx = len;
        }
    }

    // -- Undo plumbing ------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.buffer.snapshot_rows(),
            cx: self.cx,
            cy: self.cy,
            filename: self.buffer.filename().map(std::path::Path::to_path_buf),
            yank: self.yank.clone(),
        }
    }

    fn apply_snapshot(&mut self, snap: Snapshot) {
        self.buffer.restore_rows(snap.rows);
        self.cx = snap.cx;
        self.cy = snap.cy;
        self.yank = snap.yank;
        if let Some(name) = snap.filename {
            if self.buffer.filename() != Some(name.as_path()) {
                self.buffer.set_filename(name);
            }
        }
        self.clamp_cursor();
    }

    /// Keep the coalescing protocol: break a stale block, make sure one is
    /// open. Called before every coalescable edit.
    fn sync_undo_block(&mut self) {
        if self.undo.should_break_block(self.cx, self.cy) {
            self.undo.end_block();
        }
        if !self.undo.is_block_active() {
            let snap = self.snapshot();
            self.undo.begin_block(snap);
        }
    }

    /// Open a fresh block for a one-shot command (paste, join, delete
    /// selection): whatever was coalescing ends here.
    fn fresh_undo_block(&mut self) {
        self.undo.end_block();
        let snap = self.snapshot();
        self.undo.begin_block(snap);
    }

    pub fn undo(&mut self) {
        let current = self.snapshot();
        match self.undo.undo(current) {
            Some(snap) => {
                self.apply_snapshot(snap);
                self.set_status("Undo successful");
            }
            None => self.set_status("Nothing to undo"),
        }
    }

    pub fn redo(&mut self) {
        let current = self.snapshot();
        match self.undo.redo(current) {
            Some(snap) => {
                self.apply_snapshot(snap);
                self.set_status("Redo successful");
            }
            None => self.set_status("Nothing to redo"),
        }
    }

    // -- Edits --------------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        self.sync_undo_block();
        self.undo.note_edit(self.cx, self.cy);
        self.buffer.insert_char(self.cy, self.cx, c);
        self.cx += 1;
    }

    pub fn insert_newline(&mut self) {
        // Each line break is its own undo step.
        self.fresh_undo_block();
        while self.cy >= self.buffer.num_rows() {
            self.buffer.insert_row(self.buffer.num_rows(), "");
        }
        if self.cx == 0 {
            self.buffer.insert_row(self.cy, "");
        } else {
            self.buffer.split_row(self.cy, self.cx);
        }
        self.cy += 1;
        self.cx = 0;
    }

    pub fn delete_char(&mut self) {
        if self.cy >= self.buffer.num_rows() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }
        self.sync_undo_block();
        self.undo.note_edit(self.cx, self.cy);
        if let Some((cy, cx)) = self.buffer.delete_char(self.cy, self.cx) {
            self.cy = cy;
            self.cx = cx;
        }
    }

    fn replace_char_at_cursor(&mut self, c: char) {
        if self.cy < self.buffer.num_rows() && self.cx < self.buffer.row_len(self.cy) {
            self.fresh_undo_block();
            self.buffer.replace_char(self.cy, self.cx, c);
            self.undo.end_block();
        }
    }

    fn delete_line(&mut self) {
        self.fresh_undo_block();
        self.buffer.delete_row(self.cy);
        self.undo.end_block();
        self.clamp_cursor();
        self.cx = 0;
    }

    fn yank_line(&mut self) {
        if let Some(row) = self.buffer.row(self.cy) {
            let mut text = row.raw.clone();
            text.push('\n');
            self.yank = Some(text);
            self.set_status("1 line yanked");
        }
    }

    fn join_lines(&mut self) {
        if self.cy + 1 >= self.buffer.num_rows() {
            return;
        }
        self.fresh_undo_block();
        self.cx = self.buffer.row_len(self.cy);
        if self.buffer.row_len(self.cy) > 0 && self.buffer.row_len(self.cy + 1) > 0 {
            self.buffer.insert_char(self.cy, self.cx, ' ');
            self.cx += 1;
        }
        let next = self
            .buffer
            .row(self.cy + 1)
            .map(|r| r.raw.clone())
            .unwrap_or_default();
        self.buffer.append_text(self.cy, &next);
        self.buffer.delete_row(self.cy + 1);
        self.undo.end_block();
    }

    // -- Paste --------------------------------------------------------------

    /// `p` (after) / `P` (before). A yank with line breaks pastes as whole
    /// rows; otherwise the text lands in the current row at the cursor.
    /// One undo step either way.
    fn paste(&mut self, after: bool) {
        let Some(yank) = self.yank.clone() else {
            self.set_status("Nothing to paste");
            return;
        };
        if yank.is_empty() {
            self.set_status("Nothing to paste");
            return;
        }

        self.fresh_undo_block();
        if yank.contains('\n') {
            let mut lines: Vec<&str> = yank.split('\n').collect();
            if lines.last() == Some(&"") {
                lines.pop();
            }
            let at = if after {
                (self.cy + 1).min(self.buffer.num_rows())
            } else {
                self.cy
            };
            for (k, line) in lines.iter().enumerate() {
                self.buffer.insert_row(at + k, *line);
            }
            self.cy = at;
            self.cx = 0;
        } else {
            if after && self.cy < self.buffer.num_rows() {
                self.cx = (self.cx + 1).min(self.buffer.row_len(self.cy));
            }
            for c in yank.chars() {
                self.buffer.insert_char(self.cy, self.cx, c);
                self.cx += 1;
            }
        }
        self.undo.end_block();
        self.set_status(format!("Pasted {} bytes", yank.len()));
    }

    // -- Visual selection ---------------------------------------------------

    fn yank_selection(&mut self) {
        let Some(sel) = self.selection else { return };
        let cursor = Position::new(self.cy, self.cx);
        let (start, end) = sel.range(&self.buffer, cursor);
        let text = sel.extract(&self.buffer, cursor);
        let lines = end.line - start.line + 1;
        if lines > 1 {
            self.set_status(format!("{lines} lines yanked"));
        } else {
            self.set_status(format!("Yanked {} characters", text.len()));
        }
        self.yank = Some(text);
    }

    fn delete_selection(&mut self) {
        let Some(sel) = self.selection else { return };
        self.fresh_undo_block();
        let cursor = Position::new(self.cy, self.cx);
        let (start, end) = sel.range(&self.buffer, cursor);

        // Delete yanks first, so `d` and `y` agree on the text.
        self.yank = Some(selection::extract_range(&self.buffer, start, end));
        let landed = if sel.line_wise {
            selection::delete_rows(&mut self.buffer, start.line, end.line)
        } else {
            selection::delete_range(&mut self.buffer, start, end)
        };
        self.cy = landed.line;
        self.cx = landed.col;
        self.clamp_cursor();
        self.undo.end_block();
        self.set_status("Deleted selection");
    }

    // -- Colon commands -----------------------------------------------------

    /// Execute a parsed colon command.
    pub fn execute_command(&mut self, cmd: &Command) -> CommandOutcome {
        match cmd {
            Command::Jump(line) => {
                self.jump_to_line(*line);
                CommandOutcome::Continue
            }
            Command::Write => self.save_or_request_name(false),
            Command::WriteQuit => self.save_or_request_name(true),
            Command::Quit => {
                if self.buffer.is_dirty() && self.file_exists_on_disk() {
                    self.set_status("Unsaved changes. Use :q! to force quit.");
                    CommandOutcome::Continue
                } else {
                    CommandOutcome::Quit
                }
            }
            Command::ForceQuit => CommandOutcome::Quit,
            Command::Help => {
                self.set_status(command::HELP_HINT);
                CommandOutcome::Continue
            }
            Command::Unknown(text) => {
                self.set_status(format!("Unknown command: {text}"));
                CommandOutcome::Continue
            }
        }
    }

    fn jump_to_line(&mut self, line: usize) {
        if self.buffer.num_rows() == 0 {
            self.set_status("No lines in file");
            return;
        }
        let target = if line > self.buffer.num_rows() {
            self.set_status(format!(
                "Line {line} out of range, moved to line {}",
                self.buffer.num_rows()
            ));
            self.buffer.num_rows()
        } else {
            line
        };
        self.cy = target - 1;
        self.cx = 0;
        self.rowoff = self.cy;
    }

    fn file_exists_on_disk(&self) -> bool {
        self.buffer.filename().is_some_and(std::path::Path::exists)
    }

    fn save_or_request_name(&mut self, then_quit: bool) -> CommandOutcome {
        if self.buffer.filename().is_none() {
            return CommandOutcome::NeedsFilename { then_quit };
        }
        if self.save() && then_quit {
            return CommandOutcome::Quit;
        }
        CommandOutcome::Continue
    }

    /// Write the buffer to its filename. Reports the byte count or the
    /// I/O error in the status line; returns whether the save succeeded.
    pub fn save(&mut self) -> bool {
        let Some(path) = self.buffer.filename().map(std::path::Path::to_path_buf) else {
            return false;
        };
        let text = self.buffer.export_text();
        match file::save(&path, &text) {
            Ok(bytes) => {
                self.buffer.mark_clean();
                self.set_status(format!("{bytes} bytes written to disk"));
                true
            }
            Err(err) => {
                self.set_status(format!("Can't save! I/O error: {err}"));
                false
            }
        }
    }

    /// Finish a save that had no filename: adopt `name`, then save.
    pub fn save_as(&mut self, name: &str) -> bool {
        self.buffer.set_filename(name);
        self.save()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
