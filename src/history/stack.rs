use std::collections::VecDeque;

use crate::scene::snapshot::SceneSnapshot;

/// Bounded, snapshot-based undo/redo log for a single slide.
///
/// `cursor` is the state currently shown. The undo log holds earlier states bottom (oldest) to
/// top (newest); the redo log holds states undone since the last commit, top = next to redo.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    undo: VecDeque<SceneSnapshot>,
    redo: Vec<SceneSnapshot>,
    cursor: SceneSnapshot,
    depth: usize,
}

impl HistoryStack {
    /// Start a history at `initial` keeping at most `depth` undo entries (minimum 1).
    pub fn new(initial: SceneSnapshot, depth: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(depth.clamp(1, 64)),
            redo: Vec::new(),
            cursor: initial,
            depth: depth.max(1),
        }
    }

    /// Record a new committed state.
    ///
    /// The previous cursor moves onto the undo log (evicting the oldest entry at capacity) and
    /// the redo log is cleared.
    pub fn commit(&mut self, snapshot: SceneSnapshot) {
        let prev = std::mem::replace(&mut self.cursor, snapshot);
        self.push_undo(prev);
        self.redo.clear();
        tracing::debug!(
            undo = self.undo.len(),
            fingerprint = %self.cursor.fingerprint(),
            "history commit"
        );
    }

    /// Step back one state. Returns the new cursor, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<SceneSnapshot> {
        let prev = self.undo.pop_back()?;
        let current = std::mem::replace(&mut self.cursor, prev);
        self.redo.push(current);
        Some(self.cursor.clone())
    }

    /// Step forward one state. Returns the new cursor, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<SceneSnapshot> {
        let next = self.redo.pop()?;
        let current = std::mem::replace(&mut self.cursor, next);
        self.push_undo(current);
        Some(self.cursor.clone())
    }

    /// Whether [`Self::undo`] would return a state.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`Self::redo`] would return a state.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// State currently shown.
    pub fn cursor(&self) -> &SceneSnapshot {
        &self.cursor
    }

    /// Number of undo entries.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Configured maximum undo depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Undo log oldest-first followed by the cursor: the retained edit sequence.
    pub fn timeline(&self) -> impl Iterator<Item = &SceneSnapshot> {
        self.undo.iter().chain(std::iter::once(&self.cursor))
    }

    /// Drop all undo/redo entries, keeping the cursor.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, snapshot: SceneSnapshot) {
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
