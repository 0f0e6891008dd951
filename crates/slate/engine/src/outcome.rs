//! Outcomes of swipes and promotion attempts.
//!
//! Policy rejections are values the caller inspects, not errors.

use serde::Serialize;
use slate_types::{ApplicationId, BilletStatus, Decision};

/// Why a billet was not promoted onto the slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionRejection {
    /// Promotions are a business action; sandbox never reaches them.
    SandboxMode,
    /// The billet is not in the loaded feed.
    UnknownBillet,
    /// The billet cannot take applications (e.g. projected).
    NotPromotable(BilletStatus),
    /// A live application already exists for the billet.
    AlreadyOnSlate,
    /// The slate is at capacity; the billet became a favorite instead.
    SlateFull,
}

impl std::fmt::Display for PromotionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionRejection::SandboxMode => write!(f, "sandbox mode"),
            PromotionRejection::UnknownBillet => write!(f, "unknown billet"),
            PromotionRejection::NotPromotable(status) => {
                write!(f, "billet not promotable ({:?})", status)
            }
            PromotionRejection::AlreadyOnSlate => write!(f, "already on slate"),
            PromotionRejection::SlateFull => write!(f, "slate full"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionOutcome {
    Promoted(ApplicationId),
    Rejected(PromotionRejection),
}

impl PromotionOutcome {
    pub fn is_promoted(&self) -> bool {
        matches!(self, PromotionOutcome::Promoted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeOutcome {
    /// The decision landed; no promotion was attempted.
    Recorded(Decision),
    /// `super` landed and the billet was promoted onto the slate.
    Promoted(ApplicationId),
    /// `super` landed but promotion was refused.
    PromotionDenied(PromotionRejection),
    /// Sent to the back of the stack; neither ledger touched.
    Deferred,
    /// The billet is already on the slate; withdraw it before re-deciding.
    OnSlate,
}

impl SwipeOutcome {
    /// Whether the swipe pushed an undo frame.
    pub fn is_undoable(&self) -> bool {
        matches!(
            self,
            SwipeOutcome::Recorded(_) | SwipeOutcome::Promoted(_) | SwipeOutcome::PromotionDenied(_)
        )
    }

    /// Drives the "Slate Full, added to Manifest instead" notice.
    pub fn slate_full(&self) -> bool {
        matches!(
            self,
            SwipeOutcome::PromotionDenied(PromotionRejection::SlateFull)
        )
    }
}
