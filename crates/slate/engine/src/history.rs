//! Undo stack: strictly LIFO, single step, no redo.

use slate_types::{HistoryEntry, Mode};

#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<HistoryEntry>,
    limit: Option<usize>,
}

impl UndoStack {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Push a frame, dropping the oldest once past the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Drop every frame recorded against `mode`.
    pub fn discard_mode(&mut self, mode: Mode) {
        self.entries.retain(|e| e.mode != mode);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
