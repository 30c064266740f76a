//! Snapshot-based undo/redo with edit coalescing.
//!
//! One undo step is a *block*: a snapshot taken before the first edit of a
//! burst, covering every edit until the block ends. Rapid contiguous typing
//! coalesces into one step; a pause longer than the coalescing window or a
//! cursor jump (more than one column, or any row) starts a new one. The
//! caller drives that policy through [`should_break_block`] +
//! [`end_block`]/[`begin_block`]; the engine just answers the question.
//!
//! Snapshots hold raw row contents only — rendered text and highlights are
//! recomputed on restore, never stored.
//!
//! [`should_break_block`]: UndoEngine::should_break_block
//! [`end_block`]: UndoEngine::end_block
//! [`begin_block`]: UndoEngine::begin_block

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Edits further apart than this never share a block.
const COALESCE_WINDOW: Duration = Duration::from_secs(1);

/// A full editor state capture: content, cursor, filename, yank buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: Vec<String>,
    pub cx: usize,
    pub cy: usize,
    pub filename: Option<PathBuf>,
    pub yank: Option<String>,
}

/// Bounded undo and redo stacks plus the active-block bookkeeping.
#[derive(Debug)]
pub struct UndoEngine {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    max_levels: usize,
    block_active: bool,
    last_edit: Instant,
    last_cx: usize,
    last_cy: usize,
}

impl UndoEngine {
    #[must_use]
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_levels: max_levels.max(1),
            block_active: false,
            last_edit: Instant::now(),
            last_cx: 0,
            last_cy: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_block_active(&self) -> bool {
        self.block_active
    }

    #[inline]
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    // -- Block protocol -----------------------------------------------------

    /// Open a block if none is active: push `current` as the restore point
    /// and clear the redo stack. A second call while active is a no-op, so
    /// every edit path can call this unconditionally.
    pub fn begin_block(&mut self, current: Snapshot) {
        if self.block_active {
            return;
        }
        self.last_edit = Instant::now();
        self.last_cx = current.cx;
        self.last_cy = current.cy;
        self.push_undo(current);
        self.redo.clear();
        self.block_active = true;
    }

    /// Close the active block. The next edit starts a fresh undo step.
    pub const fn end_block(&mut self) {
        self.block_active = false;
    }

    /// True when the active block has gone stale: the last edit in it is
    /// older than the coalescing window, or the cursor has since moved more
    /// than one column or onto another row. Callers end the block and begin
    /// a new one before the pending edit.
    #[must_use]
    pub fn should_break_block(&self, cx: usize, cy: usize) -> bool {
        if !self.block_active {
            return false;
        }
        if self.last_edit.elapsed() > COALESCE_WINDOW {
            return true;
        }
        cy != self.last_cy || cx.abs_diff(self.last_cx) > 1
    }

    /// Record an edit inside the active block; keeps the coalescing window
    /// rolling from the most recent keystroke.
    pub fn note_edit(&mut self, cx: usize, cy: usize) {
        self.last_edit = Instant::now();
        self.last_cx = cx;
        self.last_cy = cy;
    }

    // -- Undo / redo --------------------------------------------------------

    /// Pop the newest undo snapshot, stashing `current` on the redo stack.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo.pop()?;
        self.redo.push(current);
        self.block_active = false;
        Some(restored)
    }

    /// Pop the newest redo snapshot, stashing `current` back on the undo
    /// stack (without clearing redo). Returns `None` when there is nothing
    /// to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo.pop()?;
        self.push_undo(current);
        self.block_active = false;
        Some(restored)
    }

    // -- Internals ----------------------------------------------------------

    /// Push with the depth cap: at capacity the oldest entry goes, never
    /// the newest.
    fn push_undo(&mut self, snap: Snapshot) {
        if self.undo.len() >= self.max_levels {
            self.undo.remove(0);
        }
        self.undo.push(snap);
    }

    /// Backdate the last-edit clock, for exercising the time boundary.
    #[cfg(test)]
    fn age_last_edit(&mut self, by: Duration) {
        self.last_edit -= by;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snap(lines: &[&str], cx: usize, cy: usize) -> Snapshot {
        Snapshot {
            rows: lines.iter().map(|s| (*s).to_string()).collect(),
            cx,
            cy,
            filename: None,
            yank: None,
        }
    }

    #[test]
    fn undo_on_empty_stack_is_none() {
        let mut engine = UndoEngine::new(100);
        assert!(engine.undo(snap(&["a"], 0, 0)).is_none());
        assert!(engine.redo(snap(&["a"], 0, 0)).is_none());
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut engine = UndoEngine::new(100);
        let before = snap(&["hello"], 0, 0);
        let after = snap(&["hello!"], 6, 0);

        engine.begin_block(before.clone());
        engine.end_block();

        let restored = engine.undo(after.clone()).unwrap();
        assert_eq!(restored.rows, before.rows);

        let redone = engine.redo(restored).unwrap();
        assert_eq!(redone.rows, after.rows);
    }

    #[test]
    fn rapid_edits_coalesce_into_one_block() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a"], 1, 0));
        engine.note_edit(2, 0);
        // Still active, adjacent column: no break, and a second begin_block
        // is a no-op.
        assert!(!engine.should_break_block(3, 0));
        engine.begin_block(snap(&["ab"], 2, 0));
        assert_eq!(engine.undo_depth(), 1);
    }

    #[test]
    fn column_jump_breaks_the_block() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["abcdef"], 1, 0));
        engine.note_edit(2, 0);
        assert!(!engine.should_break_block(3, 0));
        assert!(engine.should_break_block(5, 0)); // jumped two columns
    }

    #[test]
    fn any_row_motion_breaks_the_block() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a", "b"], 0, 0));
        engine.note_edit(0, 0);
        assert!(engine.should_break_block(0, 1));
    }

    #[test]
    fn stale_block_breaks_on_time() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a"], 0, 0));
        assert!(!engine.should_break_block(0, 0));
        engine.age_last_edit(Duration::from_secs(2));
        assert!(engine.should_break_block(0, 0));
    }

    #[test]
    fn breaking_and_restarting_makes_two_steps() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a"], 1, 0));
        engine.end_block();
        engine.begin_block(snap(&["ab"], 5, 0));
        assert_eq!(engine.undo_depth(), 2);
    }

    #[test]
    fn new_block_clears_the_redo_stack() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a"], 0, 0));
        engine.end_block();
        engine.undo(snap(&["ab"], 1, 0)).unwrap();
        assert_eq!(engine.redo_depth(), 1);

        engine.begin_block(snap(&["a"], 0, 0));
        assert_eq!(engine.redo_depth(), 0);
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut engine = UndoEngine::new(2);
        for i in 0..3 {
            engine.begin_block(snap(&[&i.to_string()], 0, 0));
            engine.end_block();
        }
        assert_eq!(engine.undo_depth(), 2);
        // The survivor at the bottom is snapshot "1", not "0".
        let second = engine.undo(snap(&["now"], 0, 0)).unwrap();
        assert_eq!(second.rows, vec!["2".to_string()]);
        let first = engine.undo(snap(&["x"], 0, 0)).unwrap();
        assert_eq!(first.rows, vec!["1".to_string()]);
    }

    #[test]
    fn undo_deactivates_the_block() {
        let mut engine = UndoEngine::new(100);
        engine.begin_block(snap(&["a"], 0, 0));
        assert!(engine.is_block_active());
        engine.undo(snap(&["ab"], 1, 0)).unwrap();
        assert!(!engine.is_block_active());
    }
}
