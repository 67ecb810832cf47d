use std::collections::VecDeque;

use crate::raster::Canvas;
use crate::store::Dimensions;

/// Full snapshot of an image's edited state
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub bitmap: Canvas,
    pub dimensions: Dimensions,
    pub file_size_estimate: u64,
    pub is_resized: bool,
    pub view_scale: f32,
}

/// What an undo step asks the caller to show
#[derive(Debug, Clone, PartialEq)]
pub enum Restore {
    /// Restore this snapshot
    Snapshot(HistoryEntry),
    /// Nothing left on the stack: go back to the pristine original
    Original,
}

/// Bounded per-image undo/redo stacks of whole-bitmap snapshots.
///
/// The top of the undo stack always mirrors the displayed canvas, so undoing pops the
/// top and restores whatever is underneath it.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    /// Stack of states that can be undone, oldest first
    undo_stack: VecDeque<HistoryEntry>,
    /// Stack of states that can be redone
    redo_stack: Vec<HistoryEntry>,
    max_entries: usize,
}

impl SnapshotHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new state. The oldest entry is dropped past the cap, and the redo stack
    /// is always cleared.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Replace the newest entry, e.g. once a stroke pushed on pointer-down is finished.
    /// Falls back to a push when the stack is empty.
    pub fn amend_top(&mut self, entry: HistoryEntry) {
        match self.undo_stack.back_mut() {
            Some(top) => *top = entry,
            None => self.push(entry),
        }
    }

    /// Pop the newest state onto the redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Restore> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(entry);
        Some(match self.undo_stack.back() {
            Some(top) => Restore::Snapshot(top.clone()),
            None => Restore::Original,
        })
    }

    /// Move the most recently undone state back onto the undo stack and return it.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(entry.clone());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn top(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn entry(tag: u64) -> HistoryEntry {
        HistoryEntry {
            bitmap: RgbaImage::new(1, 1),
            dimensions: Dimensions::new(1, 1),
            file_size_estimate: tag,
            is_resized: false,
            view_scale: 1.0,
        }
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = SnapshotHistory::new(3);
        for i in 0..5 {
            history.push(entry(i));
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.top().unwrap().file_size_estimate, 4);
    }

    #[test]
    fn test_undo_to_original() {
        let mut history = SnapshotHistory::default();
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.undo(), Some(Restore::Snapshot(entry(1))));
        assert_eq!(history.undo(), Some(Restore::Original));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo_len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = SnapshotHistory::default();
        history.push(entry(1));
        history.undo();
        assert!(history.can_redo());
        history.push(entry(2));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_redo_returns_entry() {
        let mut history = SnapshotHistory::default();
        history.push(entry(7));
        history.undo();
        assert_eq!(history.redo(), Some(entry(7)));
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_amend_replaces_top_without_touching_redo() {
        let mut history = SnapshotHistory::default();
        history.push(entry(1));
        history.amend_top(entry(9));
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.top().unwrap().file_size_estimate, 9);
    }
}
