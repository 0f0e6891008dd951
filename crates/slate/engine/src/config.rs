//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How non-draft applications are withdrawn.
///
/// Drafts are always hard-deleted. What happens to submitted or confirmed
/// applications depends on the external approval workflow, so it is a
/// deployment decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalPolicy {
    /// Mark non-draft applications `Withdrawn` and keep them for audit.
    #[default]
    SoftWithdraw,
    /// Delete every application outright.
    HardDelete,
    /// Refuse to withdraw anything past draft.
    DraftOnly,
}

/// Configuration for the assignment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateConfig {
    /// Maximum number of live applications on a slate.
    #[serde(default = "default_max_slate_size")]
    pub max_slate_size: usize,

    /// Debounce window before a ledger change is flushed to storage.
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Extra attempts for a failed flush.
    #[serde(default = "default_persist_retries")]
    pub persist_retries: u32,

    /// Maximum undo frames kept; unbounded when absent.
    #[serde(default)]
    pub history_limit: Option<usize>,

    #[serde(default)]
    pub withdrawal_policy: WithdrawalPolicy,
}

impl Default for SlateConfig {
    fn default() -> Self {
        Self {
            max_slate_size: default_max_slate_size(),
            persist_debounce_ms: default_persist_debounce_ms(),
            persist_retries: default_persist_retries(),
            history_limit: None,
            withdrawal_policy: WithdrawalPolicy::default(),
        }
    }
}

impl SlateConfig {
    pub fn with_max_slate_size(mut self, size: usize) -> Self {
        self.max_slate_size = size;
        self
    }

    pub fn with_withdrawal_policy(mut self, policy: WithdrawalPolicy) -> Self {
        self.withdrawal_policy = policy;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}

// Default value helpers
fn default_max_slate_size() -> usize {
    7
}

fn default_persist_debounce_ms() -> u64 {
    2000
}

fn default_persist_retries() -> u32 {
    2
}
