//! Review queue: the browse order of the card stack.
//!
//! Ordering only. Whether a billet is still up for review is derived from
//! the ledgers, so undo never has to repair the queue beyond putting the
//! billet back on top.

use slate_types::BilletId;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    order: VecDeque<BilletId>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the order, dropping repeated ids.
    pub fn load(&mut self, ids: impl IntoIterator<Item = BilletId>) {
        self.order.clear();
        let mut seen = HashSet::new();
        for id in ids {
            if seen.insert(id.clone()) {
                self.order.push_back(id);
            }
        }
    }

    /// Send a billet to the back of the stack.
    pub fn defer(&mut self, id: &BilletId) {
        self.order.retain(|b| b != id);
        self.order.push_back(id.clone());
    }

    /// Put a billet back on top.
    pub fn restore_front(&mut self, id: &BilletId) {
        self.order.retain(|b| b != id);
        self.order.push_front(id.clone());
    }

    pub fn iter(&self) -> impl Iterator<Item = &BilletId> {
        self.order.iter()
    }

    pub fn position(&self, id: &BilletId) -> Option<usize> {
        self.order.iter().position(|b| b == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
