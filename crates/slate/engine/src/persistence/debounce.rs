//! Debounced, cancelable flushes to storage.
//!
//! Each [`PersistKey`] has at most one pending flush. Scheduling a new flush
//! for a key aborts the pending one and replaces it, so a stale buffered
//! payload can never land after a newer one. Payloads are snapshots taken at
//! schedule time.

use super::traits::{SlateStorage, StoredDecisions};
use crate::events::SlateEvent;
use slate_types::{Application, SlateResult, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Which ledger a flush carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistKind {
    Decisions,
    Applications,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistKey {
    pub user_id: UserId,
    pub kind: PersistKind,
}

impl PersistKey {
    pub fn decisions(user_id: &UserId) -> Self {
        Self {
            user_id: user_id.clone(),
            kind: PersistKind::Decisions,
        }
    }

    pub fn applications(user_id: &UserId) -> Self {
        Self {
            user_id: user_id.clone(),
            kind: PersistKind::Applications,
        }
    }
}

impl std::fmt::Display for PersistKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:?}", self.user_id, self.kind)
    }
}

#[derive(Debug, Clone)]
pub enum PersistPayload {
    Decisions(StoredDecisions),
    Applications(Vec<Application>),
}

struct Pending {
    payload: PersistPayload,
    handle: JoinHandle<()>,
}

pub struct DebouncedWriter {
    storage: Arc<dyn SlateStorage>,
    delay: Duration,
    retries: u32,
    pending: HashMap<PersistKey, Pending>,
    event_tx: broadcast::Sender<SlateEvent>,
}

impl DebouncedWriter {
    pub fn new(
        storage: Arc<dyn SlateStorage>,
        delay: Duration,
        retries: u32,
        event_tx: broadcast::Sender<SlateEvent>,
    ) -> Self {
        Self {
            storage,
            delay,
            retries,
            pending: HashMap::new(),
            event_tx,
        }
    }

    pub fn storage(&self) -> Arc<dyn SlateStorage> {
        Arc::clone(&self.storage)
    }

    /// Schedule a flush after the debounce window, superseding any pending
    /// flush for the same key.
    pub fn schedule(&mut self, key: PersistKey, payload: PersistPayload) {
        self.pending.retain(|_, p| !p.handle.is_finished());
        if let Some(previous) = self.pending.remove(&key) {
            previous.handle.abort();
            debug!(key = %key, "Superseded pending flush");
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(key = %key, "No async runtime; flush skipped");
                return;
            }
        };

        let storage = Arc::clone(&self.storage);
        let event_tx = self.event_tx.clone();
        let delay = self.delay;
        let retries = self.retries;
        let task_key = key.clone();
        let task_payload = payload.clone();

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) =
                write_with_retry(storage.as_ref(), &task_key, &task_payload, retries).await
            {
                let _ = event_tx.send(SlateEvent::PersistFailed {
                    key: task_key,
                    reason: e.to_string(),
                });
            }
        });

        debug!(key = %key, delay_ms = delay.as_millis() as u64, "Scheduled flush");
        self.pending.insert(key, Pending { payload, handle });
    }

    /// Drop a pending flush without writing it.
    pub fn cancel(&mut self, key: &PersistKey) -> bool {
        match self.pending.remove(key) {
            Some(pending) => {
                pending.handle.abort();
                !pending.handle.is_finished()
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &PersistKey) -> bool {
        self.pending
            .get(key)
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .filter(|p| !p.handle.is_finished())
            .count()
    }

    /// Write every pending payload now instead of waiting out the window.
    ///
    /// Every payload is attempted; the first failure is returned.
    pub async fn flush(&mut self) -> SlateResult<()> {
        let mut first_error = None;
        let pending: Vec<(PersistKey, Pending)> = self.pending.drain().collect();

        for (key, pending) in pending {
            if pending.handle.is_finished() {
                continue;
            }
            pending.handle.abort();
            if let Err(e) =
                write_with_retry(self.storage.as_ref(), &key, &pending.payload, self.retries).await
            {
                let _ = self.event_tx.send(SlateEvent::PersistFailed {
                    key: key.clone(),
                    reason: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn write_once(
    storage: &dyn SlateStorage,
    key: &PersistKey,
    payload: &PersistPayload,
) -> SlateResult<()> {
    match payload {
        PersistPayload::Decisions(decisions) => {
            storage.save_decisions(&key.user_id, decisions).await
        }
        PersistPayload::Applications(applications) => {
            storage.save_applications(&key.user_id, applications).await
        }
    }
}

async fn write_with_retry(
    storage: &dyn SlateStorage,
    key: &PersistKey,
    payload: &PersistPayload,
    retries: u32,
) -> SlateResult<()> {
    let mut attempt = 0;
    loop {
        match write_once(storage, key, payload).await {
            Ok(()) => {
                debug!(key = %key, "Flushed to storage");
                return Ok(());
            }
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!(key = %key, attempt, error = %e, "Flush failed; retrying");
                tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
            }
            Err(e) => {
                error!(key = %key, error = %e, "Flush failed; giving up");
                return Err(e);
            }
        }
    }
}
