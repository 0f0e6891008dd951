//! In-memory storage for development and testing.

use super::traits::{SlateStorage, StoredDecisions};
use async_trait::async_trait;
use dashmap::DashMap;
use slate_types::{Application, SlateError, SlateResult, UserId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory storage implementation.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    decisions: DashMap<UserId, StoredDecisions>,
    applications: DashMap<UserId, Vec<Application>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every write fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> SlateResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SlateError::Storage("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SlateStorage for InMemoryStorage {
    async fn load_decisions(&self, user_id: &UserId) -> SlateResult<StoredDecisions> {
        Ok(self
            .decisions
            .get(user_id)
            .map(|d| d.clone())
            .unwrap_or_default())
    }

    async fn save_decisions(
        &self,
        user_id: &UserId,
        decisions: &StoredDecisions,
    ) -> SlateResult<()> {
        self.check_writable()?;
        self.decisions.insert(user_id.clone(), decisions.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_applications(&self, user_id: &UserId) -> SlateResult<Vec<Application>> {
        Ok(self
            .applications
            .get(user_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn save_applications(
        &self,
        user_id: &UserId,
        applications: &[Application],
    ) -> SlateResult<()> {
        self.check_writable()?;
        self.applications
            .insert(user_id.clone(), applications.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
