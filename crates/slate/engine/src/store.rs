//! Assignment Store - the swipe state machine.
//!
//! Owns the decision ledger, the application ledger, and the undo stack, and
//! is the only place they are mutated. Every public mutator leaves the three
//! in agreement before returning:
//!
//! - at most one live application per billet
//! - a live application implies a real `super` decision; withdrawal clears it
//! - live ranks are dense `1..=n`
//! - live applications never exceed the configured slate size
//!
//! Mutations are synchronous. Persistence is decoupled through a debounced
//! writer and only runs when the store was built with storage.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::applications::Admission;
use crate::config::{SlateConfig, WithdrawalPolicy};
use crate::events::SlateEvent;
use crate::invariants::{self, InvariantViolation};
use crate::outcome::{PromotionOutcome, PromotionRejection, SwipeOutcome};
use crate::persistence::{DebouncedWriter, PersistKey, PersistPayload, SlateStorage};
use crate::source::BilletSource;
use crate::state::SlateState;
use slate_types::{
    ApplicationId, ApplicationStatus, Billet, BilletId, Decision, HistoryEntry, Mode, SlateError,
    SlateResult, SwipeDirection, UserId,
};

pub struct AssignmentStore {
    config: SlateConfig,
    state: SlateState,
    writer: Option<DebouncedWriter>,
    event_tx: broadcast::Sender<SlateEvent>,
}

impl AssignmentStore {
    /// Create a store without durable storage.
    pub fn new(config: SlateConfig) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        Self {
            state: SlateState::new(config.max_slate_size, config.history_limit),
            config,
            writer: None,
            event_tx,
        }
    }

    /// Create a store that flushes real-mode ledgers to `storage`.
    pub fn with_storage(config: SlateConfig, storage: Arc<dyn SlateStorage>) -> Self {
        let mut store = Self::new(config);
        store.writer = Some(DebouncedWriter::new(
            storage,
            store.config.persist_debounce(),
            store.config.persist_retries,
            store.event_tx.clone(),
        ));
        store
    }

    pub fn config(&self) -> &SlateConfig {
        &self.config
    }

    pub fn state(&self) -> &SlateState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Subscribe to store events.
    pub fn subscribe(&self) -> broadcast::Receiver<SlateEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: SlateEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        let from = self.state.mode;
        if from == mode {
            return;
        }
        self.state.mode = mode;
        info!(from = %from, to = %mode, "Mode changed");
        self.emit(SlateEvent::ModeChanged { from, to: mode });
    }

    /// Install a billet feed and reseed the browse order.
    pub fn load_billets(&mut self, billets: Vec<Billet>) {
        self.state.queue.load(billets.iter().map(|b| b.id.clone()));
        self.state.billets = billets.into_iter().map(|b| (b.id.clone(), b)).collect();
        debug!(count = self.state.billets.len(), "Billets loaded");
    }

    /// Pull billets from the feed collaborator.
    #[instrument(skip(self, source))]
    pub async fn fetch_billets(
        &mut self,
        source: &dyn BilletSource,
        user_id: &UserId,
    ) -> SlateResult<usize> {
        let billets = source.fetch_billets(user_id).await?;
        let count = billets.len();
        self.load_billets(billets);
        Ok(count)
    }

    /// Replace the real-mode ledgers with what storage holds for `user_id`.
    ///
    /// Flushes still waiting on their debounce window carry the state being
    /// replaced, so they are cancelled first. Real-mode undo frames are
    /// dropped; they describe state that no longer exists. Refused while
    /// another user holds live applications, since the real decision ledger
    /// is shared by the session.
    #[instrument(skip(self))]
    pub async fn hydrate(&mut self, user_id: &UserId) -> SlateResult<()> {
        if let Some(owner) = self.foreign_owner(user_id) {
            return Err(SlateError::SessionConflict {
                user_id: user_id.clone(),
                owner,
            });
        }

        let storage = match self.writer.as_mut() {
            Some(writer) => {
                for key in [PersistKey::decisions(user_id), PersistKey::applications(user_id)] {
                    if writer.cancel(&key) {
                        debug!(key = %key, "Dropped pending flush superseded by hydrate");
                    }
                }
                writer.storage()
            }
            None => return Ok(()),
        };

        let decisions = storage.load_decisions(user_id).await?;
        let applications = storage.load_applications(user_id).await?;

        self.state.decisions.replace(Mode::Real, decisions);
        self.state
            .applications
            .replace_for_user(user_id, applications);

        let slated: Vec<BilletId> = self
            .state
            .applications
            .slate(user_id)
            .into_iter()
            .map(|a| a.billet_id.clone())
            .collect();
        for billet_id in slated {
            if self.state.decisions.get(Mode::Real, &billet_id) != Some(Decision::Super) {
                warn!(billet = %billet_id, "Stored application without super decision; repairing");
                self.state
                    .decisions
                    .record(Mode::Real, billet_id, Decision::Super);
            }
        }

        self.state.history.discard_mode(Mode::Real);
        info!(
            decisions = self.state.decisions.len(Mode::Real),
            live_applications = self.state.applications.live_count(user_id),
            "Hydrated from storage"
        );
        self.debug_check();
        Ok(())
    }

    /// Apply a swipe gesture.
    ///
    /// In sandbox mode only the sandbox ledger is written. In real mode `up`
    /// records `super` first and then attempts promotion; the decision lands
    /// even when promotion is refused. `down` only reorders the stack.
    #[instrument(skip(self))]
    pub fn swipe(
        &mut self,
        billet_id: &BilletId,
        direction: SwipeDirection,
        user_id: &UserId,
    ) -> SwipeOutcome {
        let mode = self.state.mode;

        let decision = match direction.decision() {
            Some(decision) => decision,
            None => {
                self.state.queue.defer(billet_id);
                debug!(billet = %billet_id, "Deferred");
                return SwipeOutcome::Deferred;
            }
        };

        if mode.is_real() && self.state.applications.has_live(billet_id) {
            debug!(billet = %billet_id, "Swipe ignored; billet is on the slate");
            return SwipeOutcome::OnSlate;
        }

        let previous = self
            .state
            .decisions
            .record(mode, billet_id.clone(), decision);
        debug!(billet = %billet_id, mode = %mode, decision = %decision, "Decision recorded");
        self.emit(SlateEvent::DecisionRecorded {
            mode,
            billet_id: billet_id.clone(),
            decision,
        });

        let mut entry = HistoryEntry::new(
            billet_id.clone(),
            user_id.clone(),
            mode,
            direction,
            previous,
        );

        let outcome = if mode.is_real() && direction.is_promote() {
            match self.promote(billet_id, user_id) {
                PromotionOutcome::Promoted(application_id) => {
                    entry = entry.with_created_application(application_id.clone());
                    SwipeOutcome::Promoted(application_id)
                }
                PromotionOutcome::Rejected(reason) => SwipeOutcome::PromotionDenied(reason),
            }
        } else {
            SwipeOutcome::Recorded(decision)
        };

        self.state.history.push(entry);

        if mode.is_real() {
            self.persist_decisions(user_id);
            if matches!(outcome, SwipeOutcome::Promoted(_)) {
                self.persist_applications(user_id);
            }
        }

        self.debug_check();
        outcome
    }

    /// Promote a billet onto the slate. `false` means nothing was created.
    pub fn promote_to_slate(&mut self, billet_id: &BilletId, user_id: &UserId) -> bool {
        self.try_promote(billet_id, user_id).is_promoted()
    }

    /// Promote a billet onto the slate, reporting why it was refused.
    #[instrument(skip(self))]
    pub fn try_promote(&mut self, billet_id: &BilletId, user_id: &UserId) -> PromotionOutcome {
        let before = self.state.decisions.get(Mode::Real, billet_id);
        let outcome = self.promote(billet_id, user_id);

        if self.state.decisions.get(Mode::Real, billet_id) != before {
            self.persist_decisions(user_id);
        }
        if outcome.is_promoted() {
            self.persist_applications(user_id);
        }

        self.debug_check();
        outcome
    }

    /// Admission control. Checks, in order: real mode, promotable billet,
    /// no live application, capacity. A full slate falls back to a `super`
    /// decision so the billet lands in favorites.
    fn promote(&mut self, billet_id: &BilletId, user_id: &UserId) -> PromotionOutcome {
        let rejection = if !self.state.mode.is_real() {
            Some(PromotionRejection::SandboxMode)
        } else {
            match self.state.billets.get(billet_id) {
                None => Some(PromotionRejection::UnknownBillet),
                Some(billet) if !billet.is_promotable() => {
                    Some(PromotionRejection::NotPromotable(billet.status))
                }
                Some(_) => None,
            }
        };
        if let Some(reason) = rejection {
            return self.reject(billet_id, reason);
        }

        match self
            .state
            .applications
            .admit(billet_id.clone(), user_id.clone())
        {
            Admission::Admitted(application) => {
                self.record_real(billet_id, Decision::Super);
                info!(
                    billet = %billet_id,
                    application = %application.id,
                    rank = application.preference_rank,
                    "Promoted to slate"
                );
                self.emit(SlateEvent::ApplicationCreated {
                    application_id: application.id.clone(),
                    billet_id: billet_id.clone(),
                    preference_rank: application.preference_rank,
                });
                PromotionOutcome::Promoted(application.id)
            }
            Admission::Duplicate(_) => self.reject(billet_id, PromotionRejection::AlreadyOnSlate),
            Admission::Full => {
                self.record_real(billet_id, Decision::Super);
                warn!(
                    billet = %billet_id,
                    capacity = self.config.max_slate_size,
                    "Slate full; added to manifest instead"
                );
                self.reject(billet_id, PromotionRejection::SlateFull)
            }
        }
    }

    fn reject(&self, billet_id: &BilletId, reason: PromotionRejection) -> PromotionOutcome {
        debug!(billet = %billet_id, reason = %reason, "Promotion refused");
        self.emit(SlateEvent::PromotionDenied {
            billet_id: billet_id.clone(),
            reason,
        });
        PromotionOutcome::Rejected(reason)
    }

    fn record_real(&mut self, billet_id: &BilletId, decision: Decision) {
        if self.state.decisions.get(Mode::Real, billet_id) == Some(decision) {
            return;
        }
        self.state
            .decisions
            .record(Mode::Real, billet_id.clone(), decision);
        self.emit(SlateEvent::DecisionRecorded {
            mode: Mode::Real,
            billet_id: billet_id.clone(),
            decision,
        });
    }

    /// Withdraw a live application.
    ///
    /// Drafts are hard-deleted; other statuses follow the configured
    /// [`WithdrawalPolicy`]. Remaining ranks are re-densified and the billet's
    /// decision is cleared so it does not resurface as a favorite. The
    /// resulting flush supersedes any pending one for the same ledger.
    #[instrument(skip(self))]
    pub fn withdraw_application(
        &mut self,
        application_id: &ApplicationId,
        user_id: &UserId,
    ) -> SlateResult<()> {
        let application = self
            .state
            .applications
            .get(application_id)
            .filter(|a| a.is_live())
            .cloned()
            .ok_or_else(|| SlateError::ApplicationNotFound(application_id.clone()))?;

        if !application.is_owned_by(user_id) {
            return Err(SlateError::NotOwner {
                application_id: application_id.clone(),
                user_id: user_id.clone(),
            });
        }

        let hard_delete = match (self.config.withdrawal_policy, application.status) {
            (_, ApplicationStatus::Draft) => true,
            (WithdrawalPolicy::HardDelete, _) => true,
            (WithdrawalPolicy::SoftWithdraw, _) => false,
            (WithdrawalPolicy::DraftOnly, status) => {
                return Err(SlateError::WithdrawalNotPermitted {
                    application_id: application_id.clone(),
                    status,
                });
            }
        };

        self.remove_application(application_id, hard_delete);
        self.clear_decisions_for(&application.billet_id);

        info!(
            application = %application_id,
            billet = %application.billet_id,
            status = %application.status,
            hard_delete,
            "Application withdrawn"
        );
        self.emit(SlateEvent::ApplicationWithdrawn {
            application_id: application_id.clone(),
            billet_id: application.billet_id.clone(),
            hard_deleted: hard_delete,
        });

        self.persist_decisions(user_id);
        self.persist_applications(user_id);
        self.debug_check();
        Ok(())
    }

    fn remove_application(&mut self, application_id: &ApplicationId, hard_delete: bool) {
        let removed = if hard_delete {
            self.state.applications.remove(application_id)
        } else {
            self.state.applications.mark_withdrawn(application_id)
        };
        if let Some(application) = removed {
            self.emit(SlateEvent::ApplicationsReranked {
                user_id: application.user_id,
            });
        }
    }

    /// Clear the real decision (the ledger applications belong to) and the
    /// active mode's decision when that is a different ledger.
    fn clear_decisions_for(&mut self, billet_id: &BilletId) {
        let mut modes = vec![Mode::Real];
        if self.state.mode != Mode::Real {
            modes.push(self.state.mode);
        }
        for mode in modes {
            if self.state.decisions.clear(mode, billet_id).is_some() {
                self.emit(SlateEvent::DecisionCleared {
                    mode,
                    billet_id: billet_id.clone(),
                });
            }
        }
    }

    /// Reverse the most recent swipe.
    ///
    /// Restores the prior decision in the mode the swipe was applied to, and
    /// removes the application the swipe created if it is still live. Only the
    /// top frame is considered; a frame belonging to another user is left in
    /// place.
    #[instrument(skip(self))]
    pub fn undo(&mut self, user_id: &UserId) -> Option<HistoryEntry> {
        match self.state.history.peek() {
            Some(entry) if &entry.user_id == user_id => {}
            Some(entry) => {
                warn!(owner = %entry.user_id, "Undo refused; top frame belongs to another user");
                return None;
            }
            None => return None,
        }
        let entry = self.state.history.pop()?;

        let mut removed_application = None;
        if let Some(application_id) = &entry.created_application {
            let status = self
                .state
                .applications
                .get(application_id)
                .filter(|a| a.is_live())
                .map(|a| a.status);
            if let Some(status) = status {
                self.remove_application(application_id, status.is_draft());
                removed_application = Some(application_id.clone());
            }
        }

        // A live application promoted through another path keeps its decision
        let keep_for_slate =
            entry.mode.is_real() && self.state.applications.has_live(&entry.billet_id);
        if !keep_for_slate {
            self.state.decisions.restore(
                entry.mode,
                entry.billet_id.clone(),
                entry.previous_decision,
            );
        }
        self.state.queue.restore_front(&entry.billet_id);

        info!(
            billet = %entry.billet_id,
            mode = %entry.mode,
            removed_application = ?removed_application,
            "Undo applied"
        );
        self.emit(SlateEvent::UndoApplied {
            billet_id: entry.billet_id.clone(),
            mode: entry.mode,
            removed_application: removed_application.clone(),
        });

        if entry.mode.is_real() {
            self.persist_decisions(user_id);
            if removed_application.is_some() {
                self.persist_applications(user_id);
            }
        }

        self.debug_check();
        Some(entry)
    }

    /// Move a live application to a new 1-based rank.
    #[instrument(skip(self))]
    pub fn reorder_application(
        &mut self,
        application_id: &ApplicationId,
        rank: u32,
        user_id: &UserId,
    ) -> SlateResult<()> {
        self.owned_live(application_id, user_id)?;
        self.state.applications.reorder(application_id, rank)?;
        debug!(application = %application_id, rank, "Application reranked");
        self.emit(SlateEvent::ApplicationsReranked {
            user_id: user_id.clone(),
        });
        self.persist_applications(user_id);
        self.debug_check();
        Ok(())
    }

    /// Advance an application through the submit/confirm workflow.
    #[instrument(skip(self))]
    pub fn set_application_status(
        &mut self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
        user_id: &UserId,
    ) -> SlateResult<()> {
        let from = self.owned_live(application_id, user_id)?;
        self.state.applications.transition(application_id, status)?;
        info!(application = %application_id, from = %from, to = %status, "Application status changed");
        self.emit(SlateEvent::ApplicationStatusChanged {
            application_id: application_id.clone(),
            from,
            to: status,
        });
        self.persist_applications(user_id);
        Ok(())
    }

    fn owned_live(
        &self,
        application_id: &ApplicationId,
        user_id: &UserId,
    ) -> SlateResult<ApplicationStatus> {
        let application = self
            .state
            .applications
            .get(application_id)
            .filter(|a| a.is_live())
            .ok_or_else(|| SlateError::ApplicationNotFound(application_id.clone()))?;
        if !application.is_owned_by(user_id) {
            return Err(SlateError::NotOwner {
                application_id: application_id.clone(),
                user_id: user_id.clone(),
            });
        }
        Ok(application.status)
    }

    /// Wipe the practice ledger and its undo frames.
    pub fn reset_sandbox(&mut self) {
        self.state.decisions.clear_mode(Mode::Sandbox);
        self.state.history.discard_mode(Mode::Sandbox);
        info!("Sandbox reset");
    }

    /// Live application ids for a user, in rank order.
    pub fn user_application_ids(&self, user_id: &UserId) -> Vec<ApplicationId> {
        self.state.user_application_ids(user_id)
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        invariants::check(&self.state)
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            let violations = self.check_invariants();
            debug_assert!(violations.is_empty(), "invariants violated: {:?}", violations);
        }
    }

    /// Another user holding live applications in this session, if any.
    fn foreign_owner(&self, user_id: &UserId) -> Option<UserId> {
        self.state
            .applications
            .live()
            .find(|a| !a.is_owned_by(user_id))
            .map(|a| a.user_id.clone())
    }

    fn persist_decisions(&mut self, user_id: &UserId) {
        if let Some(owner) = self.foreign_owner(user_id) {
            warn!(user = %user_id, owner = %owner, "Shared decision ledger not persisted for a second user");
            return;
        }
        if let Some(writer) = self.writer.as_mut() {
            let payload = PersistPayload::Decisions(self.state.decisions.decisions(Mode::Real).clone());
            writer.schedule(PersistKey::decisions(user_id), payload);
        }
    }

    fn persist_applications(&mut self, user_id: &UserId) {
        if let Some(writer) = self.writer.as_mut() {
            let payload = PersistPayload::Applications(self.state.applications.records_for(user_id));
            writer.schedule(PersistKey::applications(user_id), payload);
        }
    }

    /// Write pending changes now instead of waiting out the debounce window.
    pub async fn flush(&mut self) -> SlateResult<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush().await,
            None => Ok(()),
        }
    }

    /// Number of flushes still waiting on their debounce window.
    pub fn pending_writes(&self) -> usize {
        self.writer
            .as_ref()
            .map(|w| w.pending_count())
            .unwrap_or(0)
    }
}
