//! Undo frames

use crate::{ApplicationId, BilletId, Decision, Mode, SwipeDirection, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything needed to reverse exactly one swipe.
///
/// The mode is captured so that undo after a mode switch still reverses the
/// ledger the swipe was applied to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub billet_id: BilletId,
    pub user_id: UserId,
    pub mode: Mode,
    pub direction: SwipeDirection,
    /// Decision in `mode` before the swipe; `None` means there was none.
    pub previous_decision: Option<Decision>,
    /// Application created as a side effect of the swipe, if any.
    pub created_application: Option<ApplicationId>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        billet_id: BilletId,
        user_id: UserId,
        mode: Mode,
        direction: SwipeDirection,
        previous_decision: Option<Decision>,
    ) -> Self {
        Self {
            billet_id,
            user_id,
            mode,
            direction,
            previous_decision,
            created_application: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_created_application(mut self, application_id: ApplicationId) -> Self {
        self.created_application = Some(application_id);
        self
    }
}
