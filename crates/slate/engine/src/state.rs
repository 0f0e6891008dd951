//! Read-only view over the store's ledgers.
//!
//! Fields are crate-private: every mutation goes through
//! [`AssignmentStore`](crate::AssignmentStore) so the cross-ledger invariants
//! are enforced in one place.

use crate::applications::ApplicationLedger;
use crate::decisions::DecisionLedger;
use crate::history::UndoStack;
use crate::queue::ReviewQueue;
use slate_types::{Application, ApplicationId, Billet, BilletId, Decision, Mode, UserId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SlateState {
    pub(crate) mode: Mode,
    pub(crate) billets: HashMap<BilletId, Billet>,
    pub(crate) queue: ReviewQueue,
    pub(crate) decisions: DecisionLedger,
    pub(crate) applications: ApplicationLedger,
    pub(crate) history: UndoStack,
}

impl SlateState {
    pub(crate) fn new(max_slate_size: usize, history_limit: Option<usize>) -> Self {
        Self {
            mode: Mode::Real,
            billets: HashMap::new(),
            queue: ReviewQueue::new(),
            decisions: DecisionLedger::new(),
            applications: ApplicationLedger::new(max_slate_size),
            history: UndoStack::new(history_limit),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn billets(&self) -> &HashMap<BilletId, Billet> {
        &self.billets
    }

    pub fn billet(&self, id: &BilletId) -> Option<&Billet> {
        self.billets.get(id)
    }

    /// Browse order of the card stack.
    pub fn billet_stack(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn decisions(&self) -> &DecisionLedger {
        &self.decisions
    }

    pub fn real_decisions(&self) -> &HashMap<BilletId, Decision> {
        self.decisions.decisions(Mode::Real)
    }

    pub fn sandbox_decisions(&self) -> &HashMap<BilletId, Decision> {
        self.decisions.decisions(Mode::Sandbox)
    }

    /// Decision for a billet in the active mode.
    pub fn decision(&self, id: &BilletId) -> Option<Decision> {
        self.decisions.get(self.mode, id)
    }

    /// Every application record keyed by id, soft-withdrawn ones included.
    pub fn applications(&self) -> &HashMap<ApplicationId, Application> {
        self.applications.all()
    }

    pub fn application_ledger(&self) -> &ApplicationLedger {
        &self.applications
    }

    pub fn live_application_for(&self, billet_id: &BilletId) -> Option<&Application> {
        self.applications.live_for_billet(billet_id)
    }

    /// Live application ids for a user, in rank order.
    pub fn user_application_ids(&self, user_id: &UserId) -> Vec<ApplicationId> {
        self.applications
            .slate(user_id)
            .into_iter()
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}
