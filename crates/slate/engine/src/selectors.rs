//! Derived read-side projections.
//!
//! Pure functions over [`SlateState`]. The manifest and the slate are a
//! partition: a billet with a live application is on the slate and never in
//! any manifest category.

use crate::state::SlateState;
use serde::Serialize;
use slate_types::{Application, Billet, BilletId, Decision, ManifestCategory, UserId};

/// A billet in a manifest category, with its active-mode decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestItem<'a> {
    pub billet: &'a Billet,
    pub decision: Option<Decision>,
}

/// A live application joined with its billet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlateEntry<'a> {
    pub application: &'a Application,
    pub billet: Option<&'a Billet>,
}

/// Known billets in browse order; billets missing from the queue follow,
/// sorted by id.
fn ordered_billets(state: &SlateState) -> Vec<&Billet> {
    let mut ordered: Vec<&Billet> = state
        .queue
        .iter()
        .filter_map(|id| state.billets.get(id))
        .collect();

    let mut rest: Vec<&Billet> = state
        .billets
        .values()
        .filter(|b| state.queue.position(&b.id).is_none())
        .collect();
    rest.sort_by(|a, b| a.id.cmp(&b.id));

    ordered.extend(rest);
    ordered
}

/// Billets in `category` for the active mode, excluding anything on the slate.
pub fn select_manifest_items(
    state: &SlateState,
    category: ManifestCategory,
) -> Vec<ManifestItem<'_>> {
    ordered_billets(state)
        .into_iter()
        .filter(|b| !state.applications.has_live(&b.id))
        .filter_map(|billet| {
            let decision = state.decisions.get(state.mode, &billet.id);
            category
                .matches(decision)
                .then_some(ManifestItem { billet, decision })
        })
        .collect()
}

/// The user's live applications in rank order.
pub fn select_slate<'a>(state: &'a SlateState, user_id: &UserId) -> Vec<SlateEntry<'a>> {
    state
        .applications
        .slate(user_id)
        .into_iter()
        .map(|application| SlateEntry {
            application,
            billet: state.billets.get(&application.billet_id),
        })
        .collect()
}

/// The billet on top of the card stack, if any are left to review.
pub fn select_next_billet(state: &SlateState) -> Option<&Billet> {
    select_manifest_items(state, ManifestCategory::Remaining)
        .into_iter()
        .next()
        .map(|item| item.billet)
}

/// Whether a billet sits on the slate or in the manifest; `None` if unknown.
pub fn placement(state: &SlateState, billet_id: &BilletId) -> Option<Placement> {
    if state.applications.has_live(billet_id) {
        return Some(Placement::Slate);
    }
    state.billets.get(billet_id)?;
    let decision = state.decisions.get(state.mode, billet_id);
    ManifestCategory::ALL
        .into_iter()
        .find(|c| c.matches(decision))
        .map(Placement::Manifest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Slate,
    Manifest(ManifestCategory),
}
