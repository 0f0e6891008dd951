//! Cross-ledger invariant checks.
//!
//! A violation is a bug in the engine, never a runtime condition to recover
//! from. The store asserts an empty report after every mutation in debug
//! builds; tests call [`check`] directly.

use crate::state::SlateState;
use slate_types::{ApplicationId, BilletId, Decision, Mode, UserId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("billet {billet_id} has {} live applications", .applications.len())]
    DuplicateLiveApplication {
        billet_id: BilletId,
        applications: Vec<ApplicationId>,
    },

    #[error("ranks for {user_id} are not dense: {ranks:?}")]
    NonDenseRanks { user_id: UserId, ranks: Vec<u32> },

    #[error("billet {billet_id} is on the slate but its real decision is {decision:?}")]
    DecisionMismatch {
        billet_id: BilletId,
        decision: Option<Decision>,
    },

    #[error("{user_id} has {live} live applications, capacity {capacity}")]
    CapacityExceeded {
        user_id: UserId,
        live: usize,
        capacity: usize,
    },

    #[error("live index for billet {billet_id} is out of sync")]
    IndexOutOfSync { billet_id: BilletId },
}

pub fn check(state: &SlateState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let ledger = &state.applications;

    // No ghosts: at most one live application per billet
    let mut by_billet: BTreeMap<&BilletId, Vec<ApplicationId>> = BTreeMap::new();
    for app in ledger.live() {
        by_billet.entry(&app.billet_id).or_default().push(app.id.clone());
    }
    for (billet_id, mut applications) in by_billet.clone() {
        if applications.len() > 1 {
            applications.sort();
            violations.push(InvariantViolation::DuplicateLiveApplication {
                billet_id: billet_id.clone(),
                applications,
            });
        }
    }

    // The live index agrees with the records
    for (billet_id, ids) in &by_billet {
        let indexed = ledger.live_for_billet(billet_id).map(|a| &a.id);
        if ids.len() == 1 && indexed != ids.first() {
            violations.push(InvariantViolation::IndexOutOfSync {
                billet_id: (*billet_id).clone(),
            });
        }
    }

    // No zombies: a live application implies a real `super` decision
    for app in ledger.live() {
        let decision = state.decisions.get(Mode::Real, &app.billet_id);
        if decision != Some(Decision::Super) {
            violations.push(InvariantViolation::DecisionMismatch {
                billet_id: app.billet_id.clone(),
                decision,
            });
        }
    }

    // Dense ranks and capacity, per user
    let mut ranks: HashMap<&UserId, Vec<u32>> = HashMap::new();
    for app in ledger.live() {
        ranks.entry(&app.user_id).or_default().push(app.preference_rank);
    }
    for (user_id, mut user_ranks) in ranks {
        user_ranks.sort_unstable();
        let dense = user_ranks
            .iter()
            .enumerate()
            .all(|(idx, rank)| *rank == idx as u32 + 1);
        if !dense {
            violations.push(InvariantViolation::NonDenseRanks {
                user_id: user_id.clone(),
                ranks: user_ranks.clone(),
            });
        }
        if user_ranks.len() > ledger.capacity() {
            violations.push(InvariantViolation::CapacityExceeded {
                user_id: user_id.clone(),
                live: user_ranks.len(),
                capacity: ledger.capacity(),
            });
        }
    }

    violations
}
