//! Decision ledger: the latest verdict per billet, per mode.

use slate_types::{BilletId, Decision, Mode};
use std::collections::HashMap;

/// Two independent decision maps, one per mode. They never interact.
#[derive(Debug, Clone, Default)]
pub struct DecisionLedger {
    real: HashMap<BilletId, Decision>,
    sandbox: HashMap<BilletId, Decision>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, mode: Mode) -> &HashMap<BilletId, Decision> {
        match mode {
            Mode::Real => &self.real,
            Mode::Sandbox => &self.sandbox,
        }
    }

    fn map_mut(&mut self, mode: Mode) -> &mut HashMap<BilletId, Decision> {
        match mode {
            Mode::Real => &mut self.real,
            Mode::Sandbox => &mut self.sandbox,
        }
    }

    /// Record a decision, overwriting any prior one. Returns the prior value.
    pub fn record(&mut self, mode: Mode, billet_id: BilletId, decision: Decision) -> Option<Decision> {
        self.map_mut(mode).insert(billet_id, decision)
    }

    /// Remove the entry entirely. Returns the removed value.
    pub fn clear(&mut self, mode: Mode, billet_id: &BilletId) -> Option<Decision> {
        self.map_mut(mode).remove(billet_id)
    }

    /// Put back a previously captured value; `None` removes the entry.
    pub fn restore(&mut self, mode: Mode, billet_id: BilletId, decision: Option<Decision>) {
        match decision {
            Some(decision) => {
                self.record(mode, billet_id, decision);
            }
            None => {
                self.clear(mode, &billet_id);
            }
        }
    }

    pub fn get(&self, mode: Mode, billet_id: &BilletId) -> Option<Decision> {
        self.map(mode).get(billet_id).copied()
    }

    pub fn decisions(&self, mode: Mode) -> &HashMap<BilletId, Decision> {
        self.map(mode)
    }

    /// Replace one mode's map wholesale (hydration).
    pub fn replace(&mut self, mode: Mode, decisions: HashMap<BilletId, Decision>) {
        *self.map_mut(mode) = decisions;
    }

    pub fn clear_mode(&mut self, mode: Mode) {
        self.map_mut(mode).clear();
    }

    pub fn len(&self, mode: Mode) -> usize {
        self.map(mode).len()
    }

    pub fn is_empty(&self, mode: Mode) -> bool {
        self.map(mode).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let mut ledger = DecisionLedger::new();
        let id = BilletId::new("B1");
        assert_eq!(ledger.record(Mode::Real, id.clone(), Decision::Like), None);
        assert_eq!(
            ledger.record(Mode::Real, id.clone(), Decision::Super),
            Some(Decision::Like)
        );
        assert_eq!(ledger.get(Mode::Real, &id), Some(Decision::Super));
        assert_eq!(ledger.len(Mode::Real), 1);
    }

    #[test]
    fn test_modes_are_isolated() {
        let mut ledger = DecisionLedger::new();
        let id = BilletId::new("B1");
        ledger.record(Mode::Sandbox, id.clone(), Decision::Super);
        assert_eq!(ledger.get(Mode::Real, &id), None);
        ledger.clear(Mode::Real, &id);
        assert_eq!(ledger.get(Mode::Sandbox, &id), Some(Decision::Super));
    }

    #[test]
    fn test_restore_none_removes_entry() {
        let mut ledger = DecisionLedger::new();
        let id = BilletId::new("B1");
        ledger.record(Mode::Real, id.clone(), Decision::Nope);
        ledger.restore(Mode::Real, id.clone(), None);
        assert!(ledger.is_empty(Mode::Real));
        ledger.restore(Mode::Real, id.clone(), Some(Decision::Like));
        assert_eq!(ledger.get(Mode::Real, &id), Some(Decision::Like));
    }
}
