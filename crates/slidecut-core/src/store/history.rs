//! Bounded snapshot undo/redo stacks.
//!
//! ```text
//! record(s0), record(s1)          undo(current = s2)
//! ┌───────────────────────┐       ┌───────────────────────┐
//! │ undo: [s0, s1]        │  ──►  │ undo: [s0]            │
//! │ redo: []              │       │ redo: [s2]            │
//! └───────────────────────┘       └───────────────────────┘
//! ```
//!
//! Both stacks hold at most `depth` snapshots; the oldest entry is evicted
//! when a push would exceed it. Recording a new snapshot clears the redo
//! stack.

use std::collections::VecDeque;

/// Default number of snapshots kept on each stack.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Undo/redo stacks of full prior states.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo: VecDeque<T>,
    redo: VecDeque<T>,
    depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    /// Create empty stacks holding at most `depth` entries each.
    ///
    /// A depth of zero disables history entirely.
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(depth),
            redo: VecDeque::with_capacity(depth),
            depth,
        }
    }

    /// Record `prior` as the state to return to on the next undo.
    pub fn record(&mut self, prior: T) {
        self.redo.clear();
        push_bounded(&mut self.undo, prior, self.depth);
    }

    /// Swap `current` for the most recent undo snapshot.
    ///
    /// Returns `None` (and drops nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current, self.depth);
        Some(previous)
    }

    /// Swap `current` for the most recently undone snapshot.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current, self.depth);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Configured maximum depth of each stack.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

fn push_bounded<T>(stack: &mut VecDeque<T>, item: T, depth: usize) {
    if depth == 0 {
        return;
    }
    while stack.len() >= depth {
        stack.pop_front();
    }
    stack.push_back(item);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);

        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), None);
        assert_eq!(history.redo(1), Some(2));
        assert_eq!(history.redo(2), Some(3));
        assert_eq!(history.redo(3), None);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new(10);
        history.record(1);
        assert_eq!(history.undo(2), Some(1));
        assert!(history.can_redo());

        history.record(1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_oldest_snapshot_evicted() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.undo(5), Some(4));
        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), None);
    }

    #[test]
    fn test_zero_depth_records_nothing() {
        let mut history = History::new(0);
        history.record(1);
        assert!(!history.can_undo());
        assert_eq!(history.undo(2), None);
    }
}
