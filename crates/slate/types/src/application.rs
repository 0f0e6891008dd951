//! Applications: ranked promotions of billets onto the slate

use crate::{ApplicationId, BilletId, SlateError, SlateResult, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Freshly promoted, editable.
    #[default]
    Draft,
    /// Held while a submission is in flight.
    OptimisticallyLocked,
    Submitted,
    Confirmed,
    /// Retained for audit only; never counted as live.
    Withdrawn,
}

impl ApplicationStatus {
    /// Live applications count toward the slate and its invariants.
    pub fn is_live(&self) -> bool {
        !matches!(self, ApplicationStatus::Withdrawn)
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, ApplicationStatus::Draft)
    }

    /// Forward transitions of the submit/confirm workflow.
    ///
    /// `Withdrawn` is deliberately absent: it is only reachable through
    /// withdrawal, which also has to clean up the decision ledger.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, OptimisticallyLocked)
                | (Draft, Submitted)
                | (OptimisticallyLocked, Submitted)
                | (OptimisticallyLocked, Draft)
                | (Submitted, Confirmed)
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::OptimisticallyLocked => "optimistically_locked",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Confirmed => "confirmed",
            ApplicationStatus::Withdrawn => "withdrawn",
        };
        write!(f, "{}", s)
    }
}

/// A ranked promotion of a billet onto a user's slate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    /// Back-reference to the promoted billet (not ownership).
    pub billet_id: BilletId,
    pub user_id: UserId,
    pub status: ApplicationStatus,
    /// 1-based, dense among the user's live applications.
    pub preference_rank: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Create a new draft application at the given rank.
    pub fn new(billet_id: BilletId, user_id: UserId, preference_rank: u32) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::generate(),
            billet_id,
            user_id,
            status: ApplicationStatus::Draft,
            preference_rank,
            created_at: now,
            updated_at: now,
            withdrawn_at: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Advance along the workflow transition table.
    pub fn transition_to(&mut self, next: ApplicationStatus) -> SlateResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(SlateError::InvalidTransition {
                application_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Soft withdrawal: keep the record, drop it from every live view.
    pub fn mark_withdrawn(&mut self) {
        let now = Utc::now();
        self.status = ApplicationStatus::Withdrawn;
        self.withdrawn_at = Some(now);
        self.updated_at = now;
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Move to a new rank, bumping `updated_at` only on change.
    pub fn set_rank(&mut self, rank: u32) {
        if self.preference_rank != rank {
            self.preference_rank = rank;
            self.touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Application {
        Application::new(BilletId::new("B1"), UserId::new("sailor"), 1)
    }

    #[test]
    fn test_new_application_is_live_draft() {
        let app = draft();
        assert_eq!(app.status, ApplicationStatus::Draft);
        assert!(app.is_live());
        assert_eq!(app.created_at, app.updated_at);
    }

    #[test]
    fn test_workflow_transitions() {
        let mut app = draft();
        app.transition_to(ApplicationStatus::Submitted).unwrap();
        app.transition_to(ApplicationStatus::Confirmed).unwrap();
        assert!(app.transition_to(ApplicationStatus::Draft).is_err());
    }

    #[test]
    fn test_withdrawn_not_reachable_by_transition() {
        let mut app = draft();
        let err = app.transition_to(ApplicationStatus::Withdrawn).unwrap_err();
        assert!(matches!(err, SlateError::InvalidTransition { .. }));
        assert!(app.is_live());
    }

    #[test]
    fn test_mark_withdrawn() {
        let mut app = draft();
        app.mark_withdrawn();
        assert!(!app.is_live());
        assert!(app.withdrawn_at.is_some());
    }

    #[test]
    fn test_status_wire_name() {
        let json = serde_json::to_string(&ApplicationStatus::OptimisticallyLocked).unwrap();
        assert_eq!(json, "\"optimistically_locked\"");
    }
}
