//! Bounded undo history.

use std::collections::VecDeque;

use sokoban_core::Direction;

/// Number of moves the engine can take back before the oldest record falls
/// off the far end.
pub(crate) const HISTORY_CAPACITY: usize = 64;

/// One undoable record of a successful move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) direction: Direction,
    pub(crate) pushed: bool,
}

/// Capped stack of move records.
///
/// Appending at capacity evicts the oldest entry; eviction is contract, not
/// an implementation accident.
#[derive(Clone, Debug)]
pub(crate) struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStack {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == HISTORY_CAPACITY {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub(crate) fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
