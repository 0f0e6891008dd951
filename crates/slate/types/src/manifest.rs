//! Manifest categories

use crate::Decision;
use serde::{Deserialize, Serialize};

/// Read-side grouping of billets that are not on the slate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestCategory {
    /// Liked.
    Candidates,
    /// Super-liked but not promoted.
    Favorites,
    /// Noped.
    Passed,
    /// No decision yet.
    Remaining,
}

impl ManifestCategory {
    pub const ALL: [ManifestCategory; 4] = [
        ManifestCategory::Candidates,
        ManifestCategory::Favorites,
        ManifestCategory::Passed,
        ManifestCategory::Remaining,
    ];

    /// Whether a billet with this decision belongs in the category.
    pub fn matches(&self, decision: Option<Decision>) -> bool {
        matches!(
            (self, decision),
            (ManifestCategory::Candidates, Some(Decision::Like))
                | (ManifestCategory::Favorites, Some(Decision::Super))
                | (ManifestCategory::Passed, Some(Decision::Nope))
                | (ManifestCategory::Remaining, None)
        )
    }
}
