//! Bounded undo/redo history.

use std::collections::VecDeque;

/// Default number of undo steps kept by an editor.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Snapshot-based undo/redo stacks.
///
/// Recording a new state clears the redo stack. When the undo stack is full
/// the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct History<T> {
    limit: usize,
    undo: VecDeque<T>,
    redo: Vec<T>,
}

impl<T> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    /// Records `previous` as the state to return to on the next undo.
    pub fn record(&mut self, previous: T) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
        self.redo.clear();
    }

    /// Pops the last recorded state, pushing `current` onto the redo stack.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Pops the last undone state, pushing `current` back onto the undo stack.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo_walks_back_and_forth() {
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
    fn recording_clears_redo() {
        let mut history = History::new(10);
        history.record("a");
        assert_eq!(history.undo("b"), Some("a"));
        assert!(history.can_redo());

        history.record("a");
        assert!(!history.can_redo());
    }

    #[test]
    fn oldest_entries_fall_off_at_the_limit() {
        let mut history = History::new(2);
        history.record(1);
        history.record(2);
        history.record(3);

        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), None);
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        let history: History<u8> = History::new(0);
        assert_eq!(history.limit(), 1);
    }
}
