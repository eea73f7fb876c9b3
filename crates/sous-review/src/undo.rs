//! Bounded undo history

use sous_recipe::Recipe;
use std::collections::VecDeque;

/// Stack of pre-application recipe snapshots
///
/// When full, pushing drops the oldest snapshot. A capacity of zero keeps
/// nothing.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<Recipe>,
    capacity: usize,
}

impl UndoStack {
    /// Create an empty stack holding at most `capacity` snapshots
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a snapshot
    pub fn push(&mut self, snapshot: Recipe) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Pop the most recent snapshot
    pub fn pop(&mut self) -> Option<Recipe> {
        self.entries.pop_back()
    }

    /// Most recent snapshot
    #[must_use]
    pub fn peek(&self) -> Option<&Recipe> {
        self.entries.back()
    }

    /// Number of snapshots held
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum depth
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(version: u64) -> Recipe {
        Recipe::new("Soup").with_version(version)
    }

    #[test]
    fn drops_oldest_when_full() {
        let mut stack = UndoStack::new(2);
        stack.push(at(1));
        stack.push(at(2));
        stack.push(at(3));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().map(|r| r.version), Some(3));
        assert_eq!(stack.pop().map(|r| r.version), Some(2));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut stack = UndoStack::new(0);
        stack.push(at(1));
        assert!(stack.is_empty());
    }
}
