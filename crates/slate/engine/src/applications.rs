//! Application ledger with capacity admission control.
//!
//! Holds every application record (live and soft-withdrawn) plus an index of
//! the single live application per billet. Ranks are kept dense per user:
//! any removal renumbers the survivors `1..=n` in their existing order.

use slate_types::{
    Application, ApplicationId, ApplicationStatus, BilletId, SlateError, SlateResult, UserId,
};
use std::collections::HashMap;
use tracing::warn;

/// Result of asking the ledger to admit a billet onto a user's slate.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// A new draft application was created.
    Admitted(Application),
    /// The billet already has a live application.
    Duplicate(ApplicationId),
    /// The user's slate is at capacity.
    Full,
}

/// Application records keyed by id, with a live-per-billet index.
#[derive(Debug, Clone)]
pub struct ApplicationLedger {
    applications: HashMap<ApplicationId, Application>,
    live_by_billet: HashMap<BilletId, ApplicationId>,
    capacity: usize,
}

impl ApplicationLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            applications: HashMap::new(),
            live_by_billet: HashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.get(id)
    }

    /// All records, including soft-withdrawn ones.
    pub fn all(&self) -> &HashMap<ApplicationId, Application> {
        &self.applications
    }

    pub fn live(&self) -> impl Iterator<Item = &Application> {
        self.applications.values().filter(|a| a.is_live())
    }

    pub fn live_for_billet(&self, billet_id: &BilletId) -> Option<&Application> {
        self.live_by_billet
            .get(billet_id)
            .and_then(|id| self.applications.get(id))
    }

    pub fn has_live(&self, billet_id: &BilletId) -> bool {
        self.live_by_billet.contains_key(billet_id)
    }

    pub fn live_count(&self, user_id: &UserId) -> usize {
        self.live().filter(|a| a.is_owned_by(user_id)).count()
    }

    pub fn is_full(&self, user_id: &UserId) -> bool {
        self.live_count(user_id) >= self.capacity
    }

    /// The user's live applications in rank order.
    pub fn slate(&self, user_id: &UserId) -> Vec<&Application> {
        let mut slate: Vec<&Application> =
            self.live().filter(|a| a.is_owned_by(user_id)).collect();
        slate.sort_by_key(|a| a.preference_rank);
        slate
    }

    /// Admit a billet: never a duplicate, never past capacity.
    pub fn admit(&mut self, billet_id: BilletId, user_id: UserId) -> Admission {
        if let Some(existing) = self.live_by_billet.get(&billet_id) {
            return Admission::Duplicate(existing.clone());
        }
        if self.is_full(&user_id) {
            return Admission::Full;
        }

        let next_rank = self
            .live()
            .filter(|a| a.is_owned_by(&user_id))
            .map(|a| a.preference_rank)
            .max()
            .unwrap_or(0)
            + 1;

        let application = Application::new(billet_id.clone(), user_id, next_rank);
        self.live_by_billet.insert(billet_id, application.id.clone());
        self.applications
            .insert(application.id.clone(), application.clone());
        Admission::Admitted(application)
    }

    /// Hard delete, then re-densify the owner's ranks.
    pub fn remove(&mut self, id: &ApplicationId) -> Option<Application> {
        let removed = self.applications.remove(id)?;
        if self.live_by_billet.get(&removed.billet_id) == Some(id) {
            self.live_by_billet.remove(&removed.billet_id);
        }
        self.redensify(&removed.user_id);
        Some(removed)
    }

    /// Soft withdrawal: keep the record for audit, drop it from live views.
    pub fn mark_withdrawn(&mut self, id: &ApplicationId) -> Option<Application> {
        let app = self.applications.get_mut(id)?;
        if !app.is_live() {
            return None;
        }
        app.mark_withdrawn();
        let snapshot = app.clone();
        self.live_by_billet.remove(&snapshot.billet_id);
        self.redensify(&snapshot.user_id);
        Some(snapshot)
    }

    /// Advance a live application along the workflow.
    pub fn transition(
        &mut self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> SlateResult<&Application> {
        let app = self
            .applications
            .get_mut(id)
            .filter(|a| a.is_live())
            .ok_or_else(|| SlateError::ApplicationNotFound(id.clone()))?;
        app.transition_to(status)?;
        Ok(app)
    }

    /// Move a live application to `rank`, shifting the others.
    pub fn reorder(&mut self, id: &ApplicationId, rank: u32) -> SlateResult<()> {
        let user_id = match self.applications.get(id) {
            Some(app) if app.is_live() => app.user_id.clone(),
            _ => return Err(SlateError::ApplicationNotFound(id.clone())),
        };

        let mut order: Vec<ApplicationId> =
            self.slate(&user_id).into_iter().map(|a| a.id.clone()).collect();
        if rank == 0 || rank as usize > order.len() {
            return Err(SlateError::InvalidRank {
                rank,
                live: order.len(),
            });
        }

        order.retain(|a| a != id);
        order.insert(rank as usize - 1, id.clone());
        self.apply_order(&order);
        Ok(())
    }

    /// Renumber a user's live applications to `1..=n`, preserving order.
    pub fn redensify(&mut self, user_id: &UserId) {
        let order: Vec<ApplicationId> =
            self.slate(user_id).into_iter().map(|a| a.id.clone()).collect();
        self.apply_order(&order);
    }

    fn apply_order(&mut self, order: &[ApplicationId]) {
        for (idx, id) in order.iter().enumerate() {
            if let Some(app) = self.applications.get_mut(id) {
                app.set_rank(idx as u32 + 1);
            }
        }
    }

    /// Replace a user's records wholesale (hydration from storage).
    ///
    /// A second live record for an already-claimed billet, or any live record
    /// past capacity, is demoted to withdrawn rather than trusted.
    pub fn replace_for_user(&mut self, user_id: &UserId, mut records: Vec<Application>) {
        let stale: Vec<ApplicationId> = self
            .applications
            .values()
            .filter(|a| a.is_owned_by(user_id))
            .map(|a| a.id.clone())
            .collect();
        for id in stale {
            if let Some(app) = self.applications.remove(&id) {
                if self.live_by_billet.get(&app.billet_id) == Some(&id) {
                    self.live_by_billet.remove(&app.billet_id);
                }
            }
        }

        records.sort_by_key(|a| (a.preference_rank, a.created_at));
        let mut live = 0;
        for mut app in records.into_iter().filter(|a| a.is_owned_by(user_id)) {
            if app.is_live() {
                if self.live_by_billet.contains_key(&app.billet_id) {
                    warn!(
                        application = %app.id,
                        billet = %app.billet_id,
                        "Duplicate live application in stored records; demoting"
                    );
                    app.mark_withdrawn();
                } else if live >= self.capacity {
                    warn!(
                        application = %app.id,
                        capacity = self.capacity,
                        "Stored slate exceeds capacity; demoting"
                    );
                    app.mark_withdrawn();
                } else {
                    live += 1;
                    self.live_by_billet
                        .insert(app.billet_id.clone(), app.id.clone());
                }
            }
            self.applications.insert(app.id.clone(), app);
        }
        self.redensify(user_id);
    }

    /// Records belonging to one user, for persistence.
    pub fn records_for(&self, user_id: &UserId) -> Vec<Application> {
        let mut records: Vec<Application> = self
            .applications
            .values()
            .filter(|a| a.is_owned_by(user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            (!a.is_live(), a.preference_rank, a.created_at)
                .cmp(&(!b.is_live(), b.preference_rank, b.created_at))
        });
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("sailor")
    }

    fn admit(ledger: &mut ApplicationLedger, billet: &str) -> Application {
        match ledger.admit(BilletId::new(billet), user()) {
            Admission::Admitted(app) => app,
            other => panic!("expected admission, got {:?}", other),
        }
    }

    fn ranks(ledger: &ApplicationLedger) -> Vec<(String, u32)> {
        ledger
            .slate(&user())
            .iter()
            .map(|a| (a.billet_id.0.clone(), a.preference_rank))
            .collect()
    }

    #[test]
    fn test_admission_assigns_next_rank() {
        let mut ledger = ApplicationLedger::new(7);
        assert_eq!(admit(&mut ledger, "A").preference_rank, 1);
        assert_eq!(admit(&mut ledger, "B").preference_rank, 2);
        assert_eq!(ledger.live_count(&user()), 2);
    }

    #[test]
    fn test_duplicate_admission_rejected() {
        let mut ledger = ApplicationLedger::new(7);
        let first = admit(&mut ledger, "A");
        assert_eq!(
            ledger.admit(BilletId::new("A"), user()),
            Admission::Duplicate(first.id)
        );
        assert_eq!(ledger.live().count(), 1);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut ledger = ApplicationLedger::new(2);
        admit(&mut ledger, "A");
        admit(&mut ledger, "B");
        assert_eq!(ledger.admit(BilletId::new("C"), user()), Admission::Full);
        assert!(ledger.is_full(&user()));
    }

    #[test]
    fn test_remove_redensifies() {
        let mut ledger = ApplicationLedger::new(7);
        admit(&mut ledger, "A");
        let b = admit(&mut ledger, "B");
        admit(&mut ledger, "C");
        admit(&mut ledger, "D");

        ledger.remove(&b.id).unwrap();
        assert_eq!(
            ranks(&ledger),
            vec![("A".into(), 1), ("C".into(), 2), ("D".into(), 3)]
        );
        assert!(!ledger.has_live(&BilletId::new("B")));
    }

    #[test]
    fn test_soft_withdraw_keeps_record_but_frees_slot() {
        let mut ledger = ApplicationLedger::new(1);
        let a = admit(&mut ledger, "A");
        ledger.mark_withdrawn(&a.id).unwrap();

        assert_eq!(ledger.all().len(), 1);
        assert_eq!(ledger.live_count(&user()), 0);
        assert!(matches!(
            ledger.admit(BilletId::new("A"), user()),
            Admission::Admitted(_)
        ));
    }

    #[test]
    fn test_reorder_moves_and_shifts() {
        let mut ledger = ApplicationLedger::new(7);
        admit(&mut ledger, "A");
        admit(&mut ledger, "B");
        let c = admit(&mut ledger, "C");

        ledger.reorder(&c.id, 1).unwrap();
        assert_eq!(
            ranks(&ledger),
            vec![("C".into(), 1), ("A".into(), 2), ("B".into(), 3)]
        );

        let err = ledger.reorder(&c.id, 4).unwrap_err();
        assert!(matches!(err, SlateError::InvalidRank { rank: 4, live: 3 }));
    }

    #[test]
    fn test_transition_rejects_withdrawn() {
        let mut ledger = ApplicationLedger::new(7);
        let a = admit(&mut ledger, "A");
        ledger.mark_withdrawn(&a.id);
        assert!(ledger
            .transition(&a.id, ApplicationStatus::Submitted)
            .is_err());
    }

    #[test]
    fn test_replace_for_user_demotes_duplicates() {
        let mut ledger = ApplicationLedger::new(7);
        let mut first = Application::new(BilletId::new("A"), user(), 1);
        first.preference_rank = 3;
        let second = Application::new(BilletId::new("A"), user(), 5);
        let other = Application::new(BilletId::new("B"), user(), 9);

        ledger.replace_for_user(&user(), vec![first.clone(), second.clone(), other]);

        assert_eq!(ledger.live_count(&user()), 2);
        assert_eq!(ledger.live_for_billet(&BilletId::new("A")).unwrap().id, first.id);
        assert!(!ledger.get(&second.id).unwrap().is_live());
        assert_eq!(ranks(&ledger), vec![("A".into(), 1), ("B".into(), 2)]);
    }
}
