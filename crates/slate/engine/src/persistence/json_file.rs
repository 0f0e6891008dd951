//! JSON-file storage.
//!
//! One document per user and ledger under a directory, named
//! `<hex(user_id)>.<ledger>.json`. Writes are atomic (write to `.tmp`, then
//! rename) so an interrupted flush never leaves a half-written ledger behind.

use super::traits::{SlateStorage, StoredDecisions};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use slate_types::{Application, SlateError, SlateResult, UserId};
use std::path::{Path, PathBuf};

pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &UserId, ledger: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}.json", hex::encode(user_id.0.as_str()), ledger))
    }

    async fn read<T: DeserializeOwned + Default>(&self, path: &Path) -> SlateResult<T> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(SlateError::Storage(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_str(&contents).map_err(|e| {
            SlateError::Serialization(format!("deserialization failed: {}", e))
        })
    }

    async fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> SlateResult<()> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            SlateError::Serialization(format!("serialization failed: {}", e))
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SlateError::Storage(format!("{}: {}", self.dir.display(), e)))?;

        // Atomic write: write to .tmp then rename
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| SlateError::Storage(format!("{}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| SlateError::Storage(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl SlateStorage for JsonFileStorage {
    async fn load_decisions(&self, user_id: &UserId) -> SlateResult<StoredDecisions> {
        self.read(&self.path_for(user_id, "decisions")).await
    }

    async fn save_decisions(
        &self,
        user_id: &UserId,
        decisions: &StoredDecisions,
    ) -> SlateResult<()> {
        self.write(&self.path_for(user_id, "decisions"), decisions)
            .await
    }

    async fn load_applications(&self, user_id: &UserId) -> SlateResult<Vec<Application>> {
        self.read(&self.path_for(user_id, "applications")).await
    }

    async fn save_applications(
        &self,
        user_id: &UserId,
        applications: &[Application],
    ) -> SlateResult<()> {
        self.write(&self.path_for(user_id, "applications"), applications)
            .await
    }
}
