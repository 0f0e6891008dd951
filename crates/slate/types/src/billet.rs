//! Job billets

use crate::BilletId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Availability of a billet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BilletStatus {
    /// Open for applications.
    #[default]
    Open,
    /// Future vacancy, visible but not yet applicable.
    Projected,
    /// Filled or removed from the cycle.
    Closed,
}

impl BilletStatus {
    /// Only open billets may be promoted onto the slate.
    pub fn is_promotable(&self) -> bool {
        matches!(self, BilletStatus::Open)
    }
}

/// A job billet as served by the assignment feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Billet {
    pub id: BilletId,
    pub title: String,
    /// Owning command (unit).
    pub command: String,
    pub location: String,
    /// Rating/designator the billet is coded for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designator: Option<String>,
    #[serde(default)]
    pub status: BilletStatus,
    /// Report-no-later-than date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_by: Option<NaiveDate>,
}

impl Billet {
    pub fn new(
        id: BilletId,
        title: impl Into<String>,
        command: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            command: command.into(),
            location: location.into(),
            designator: None,
            status: BilletStatus::Open,
            report_by: None,
        }
    }

    pub fn with_status(mut self, status: BilletStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_designator(mut self, designator: impl Into<String>) -> Self {
        self.designator = Some(designator.into());
        self
    }

    pub fn with_report_by(mut self, date: NaiveDate) -> Self {
        self.report_by = Some(date);
        self
    }

    pub fn is_promotable(&self) -> bool {
        self.status.is_promotable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_billets_promotable() {
        let billet = Billet::new(BilletId::new("B1"), "ET1", "USS Example", "Norfolk, VA");
        assert!(billet.is_promotable());
        assert!(!billet.clone().with_status(BilletStatus::Projected).is_promotable());
        assert!(!billet.with_status(BilletStatus::Closed).is_promotable());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let billet: Billet = serde_json::from_str(
            r#"{"id":"B7","title":"Division Officer","command":"NAVSTA","location":"Rota, Spain"}"#,
        )
        .unwrap();
        assert_eq!(billet.status, BilletStatus::Open);
        assert!(billet.designator.is_none());
    }
}
