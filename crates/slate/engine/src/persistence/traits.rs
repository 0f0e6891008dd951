//! Storage trait definitions

use async_trait::async_trait;
use slate_types::{Application, BilletId, Decision, SlateResult, UserId};
use std::collections::HashMap;

/// A user's persisted real-mode decisions.
pub type StoredDecisions = HashMap<BilletId, Decision>;

/// Durable key-value storage for a user's ledgers.
///
/// Only real-mode state is persisted; sandbox decisions live for the
/// session only.
#[async_trait]
pub trait SlateStorage: Send + Sync {
    /// Load the user's decisions; empty when nothing was stored.
    async fn load_decisions(&self, user_id: &UserId) -> SlateResult<StoredDecisions>;

    /// Replace the user's stored decisions.
    async fn save_decisions(&self, user_id: &UserId, decisions: &StoredDecisions)
        -> SlateResult<()>;

    /// Load the user's application records; empty when nothing was stored.
    async fn load_applications(&self, user_id: &UserId) -> SlateResult<Vec<Application>>;

    /// Replace the user's stored application records.
    async fn save_applications(
        &self,
        user_id: &UserId,
        applications: &[Application],
    ) -> SlateResult<()>;
}
