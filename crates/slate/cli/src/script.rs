//! Scripted swipe sessions.
//!
//! A script is a JSON array of actions replayed in order against one store:
//!
//! ```json
//! [
//!   { "action": "swipe", "billet": "B1", "direction": "up" },
//!   { "action": "swipe", "billet": "B2", "direction": "right" },
//!   { "action": "withdraw", "billet": "B1" },
//!   { "action": "wait", "ms": 2200 }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use slate_engine::{AssignmentStore, SwipeOutcome};
use slate_types::{
    ApplicationId, ApplicationStatus, BilletId, Mode, SlateError, SlateResult, SwipeDirection,
    UserId,
};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Swipe {
        billet: BilletId,
        direction: SwipeDirection,
    },
    Promote {
        billet: BilletId,
    },
    /// Withdraw the live application for a billet.
    Withdraw {
        billet: BilletId,
    },
    Undo,
    SetMode {
        mode: Mode,
    },
    Reorder {
        billet: BilletId,
        rank: u32,
    },
    SetStatus {
        billet: BilletId,
        status: ApplicationStatus,
    },
    ResetSandbox,
    /// Let the clock run, e.g. past the persistence debounce window.
    Wait {
        ms: u64,
    },
}

/// What one action did.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: usize,
    pub action: Action,
    pub result: String,
    pub ok: bool,
}

impl StepResult {
    fn ok(step: usize, action: &Action, result: impl Into<String>) -> Self {
        Self {
            step,
            action: action.clone(),
            result: result.into(),
            ok: true,
        }
    }

    fn failed(step: usize, action: &Action, error: SlateError) -> Self {
        Self {
            step,
            action: action.clone(),
            result: error.to_string(),
            ok: false,
        }
    }
}

pub fn parse(json: &str) -> serde_json::Result<Vec<Action>> {
    serde_json::from_str(json)
}

/// Replay `actions` for `user_id`. Caller errors are recorded per step and
/// never abort the run.
pub async fn run(
    store: &mut AssignmentStore,
    actions: &[Action],
    user_id: &UserId,
) -> Vec<StepResult> {
    let mut results = Vec::with_capacity(actions.len());

    for (idx, action) in actions.iter().enumerate() {
        let step = idx + 1;
        let result = match action {
            Action::Swipe { billet, direction } => {
                let outcome = store.swipe(billet, *direction, user_id);
                StepResult::ok(step, action, describe_swipe(&outcome))
            }
            Action::Promote { billet } => {
                let outcome = store.try_promote(billet, user_id);
                StepResult::ok(step, action, format!("{:?}", outcome))
            }
            Action::Withdraw { billet } => match live_application(store, billet) {
                Ok(application_id) => match store.withdraw_application(&application_id, user_id) {
                    Ok(()) => StepResult::ok(step, action, format!("withdrew {}", application_id)),
                    Err(e) => StepResult::failed(step, action, e),
                },
                Err(e) => StepResult::failed(step, action, e),
            },
            Action::Undo => match store.undo(user_id) {
                Some(entry) => StepResult::ok(
                    step,
                    action,
                    format!("undid {} {:?}", entry.billet_id, entry.direction),
                ),
                None => StepResult::ok(step, action, "nothing to undo"),
            },
            Action::SetMode { mode } => {
                store.set_mode(*mode);
                StepResult::ok(step, action, format!("mode {}", mode))
            }
            Action::Reorder { billet, rank } => {
                let result = live_application(store, billet)
                    .and_then(|id| store.reorder_application(&id, *rank, user_id));
                match result {
                    Ok(()) => StepResult::ok(step, action, format!("rank {}", rank)),
                    Err(e) => StepResult::failed(step, action, e),
                }
            }
            Action::SetStatus { billet, status } => {
                let result = live_application(store, billet)
                    .and_then(|id| store.set_application_status(&id, *status, user_id));
                match result {
                    Ok(()) => StepResult::ok(step, action, format!("status {}", status)),
                    Err(e) => StepResult::failed(step, action, e),
                }
            }
            Action::ResetSandbox => {
                store.reset_sandbox();
                StepResult::ok(step, action, "sandbox cleared")
            }
            Action::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                StepResult::ok(step, action, format!("waited {}ms", ms))
            }
        };
        results.push(result);
    }

    results
}

fn live_application(store: &AssignmentStore, billet: &BilletId) -> SlateResult<ApplicationId> {
    store
        .state()
        .live_application_for(billet)
        .map(|a| a.id.clone())
        .ok_or_else(|| SlateError::NotOnSlate(billet.clone()))
}

fn describe_swipe(outcome: &SwipeOutcome) -> String {
    match outcome {
        SwipeOutcome::Recorded(decision) => format!("recorded {}", decision),
        SwipeOutcome::Promoted(id) => format!("promoted as {}", id),
        SwipeOutcome::PromotionDenied(reason) if outcome.slate_full() => {
            format!("{}; added to manifest instead", reason)
        }
        SwipeOutcome::PromotionDenied(reason) => format!("not promoted: {}", reason),
        SwipeOutcome::Deferred => "deferred".to_string(),
        SwipeOutcome::OnSlate => "already on slate".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_engine::SlateConfig;
    use slate_types::Billet;

    #[test]
    fn test_parse_script() {
        let actions = parse(
            r#"[
                { "action": "swipe", "billet": "B1", "direction": "up" },
                { "action": "set_mode", "mode": "sandbox" },
                { "action": "undo" },
                { "action": "set_status", "billet": "B1", "status": "submitted" },
                { "action": "wait", "ms": 10 }
            ]"#,
        )
        .unwrap();

        assert_eq!(actions.len(), 5);
        assert_eq!(
            actions[0],
            Action::Swipe {
                billet: BilletId::new("B1"),
                direction: SwipeDirection::Up,
            }
        );
        assert_eq!(actions[1], Action::SetMode { mode: Mode::Sandbox });
        assert_eq!(actions[2], Action::Undo);
    }

    #[tokio::test]
    async fn test_run_records_failures_per_step() {
        let mut store = AssignmentStore::new(SlateConfig::default());
        store.load_billets(vec![Billet::new(BilletId::new("B1"), "ET1", "USS Example", "Norfolk, VA")]);
        let user = UserId::new("sailor");

        let actions = vec![
            Action::Withdraw { billet: BilletId::new("B1") },
            Action::Swipe { billet: BilletId::new("B1"), direction: SwipeDirection::Up },
            Action::Withdraw { billet: BilletId::new("B1") },
        ];
        let results = run(&mut store, &actions, &user).await;

        assert!(!results[0].ok);
        assert!(results[1].ok);
        assert!(results[1].result.starts_with("promoted"));
        assert!(results[2].ok);
        assert!(store.user_application_ids(&user).is_empty());
    }
}
