//! Events broadcast by the assignment store.

use crate::outcome::PromotionRejection;
use crate::persistence::PersistKey;
use slate_types::{ApplicationId, ApplicationStatus, BilletId, Decision, Mode, UserId};

#[derive(Debug, Clone)]
pub enum SlateEvent {
    /// A decision was written to a ledger.
    DecisionRecorded {
        mode: Mode,
        billet_id: BilletId,
        decision: Decision,
    },

    /// A decision was removed from a ledger.
    DecisionCleared { mode: Mode, billet_id: BilletId },

    /// A billet was promoted onto the slate.
    ApplicationCreated {
        application_id: ApplicationId,
        billet_id: BilletId,
        preference_rank: u32,
    },

    /// A promotion attempt was refused.
    PromotionDenied {
        billet_id: BilletId,
        reason: PromotionRejection,
    },

    /// An application left the slate.
    ApplicationWithdrawn {
        application_id: ApplicationId,
        billet_id: BilletId,
        hard_deleted: bool,
    },

    /// Ranks were renumbered for a user.
    ApplicationsReranked { user_id: UserId },

    /// An application advanced through the workflow.
    ApplicationStatusChanged {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    /// A swipe was reversed.
    UndoApplied {
        billet_id: BilletId,
        mode: Mode,
        removed_application: Option<ApplicationId>,
    },

    /// The active mode changed.
    ModeChanged { from: Mode, to: Mode },

    /// A flush to storage failed after all retries.
    PersistFailed { key: PersistKey, reason: String },
}
