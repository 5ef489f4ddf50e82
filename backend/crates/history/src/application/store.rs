//! History Store Use Cases

use crate::application::config::HistoryConfig;
use crate::domain::entities::{HistoryRecord, NewHistoryRecord};
use crate::error::{HistoryError, HistoryResult};
use kernel::clock::{Clock, SystemClock};
use kernel::id::HistoryRecordId;
use platform::compaction::ImageCompactor;
use platform::store::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bounded, newest-first log of generated artifacts
pub struct HistoryStore<S, I, C = SystemClock>
where
    S: KeyValueStore + Send + Sync,
    I: ImageCompactor + Send + Sync,
    C: Clock,
{
    store: Arc<S>,
    compactor: I,
    clock: C,
    config: HistoryConfig,
    /// Serializes read-modify-write cycles issued through this instance
    write_lock: Mutex<()>,
}

impl<S, I> HistoryStore<S, I, SystemClock>
where
    S: KeyValueStore + Send + Sync,
    I: ImageCompactor + Send + Sync,
{
    pub fn new(store: Arc<S>, compactor: I, config: HistoryConfig) -> Self {
        Self::with_clock(store, compactor, config, SystemClock)
    }
}

impl<S, I, C> HistoryStore<S, I, C>
where
    S: KeyValueStore + Send + Sync,
    I: ImageCompactor + Send + Sync,
    C: Clock,
{
    pub fn with_clock(store: Arc<S>, compactor: I, config: HistoryConfig, clock: C) -> Self {
        Self {
            store,
            compactor,
            clock,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Current list, newest first; empty when absent or unreadable
    pub async fn list(&self) -> Vec<HistoryRecord> {
        match self.load().await {
            Ok(records) => records,
            Err(e) => {
                e.log();
                Vec::new()
            }
        }
    }

    pub async fn count(&self) -> usize {
        self.list().await.len()
    }

    /// Compact and prepend a new record
    ///
    /// Returns the list as persisted. When even the shortened list cannot be
    /// written the result is empty; this never fails.
    pub async fn add(&self, input: NewHistoryRecord) -> Vec<HistoryRecord> {
        let input = self.compact(input).await;

        let _guard = self.write_lock.lock().await;
        let record = HistoryRecord::new(input, self.clock.now_utc());
        let id = record.id.clone();

        let mut records = self.list().await;
        records.insert(0, record);
        records.truncate(self.config.max_records);

        match self.persist(&records).await {
            Ok(()) => {
                tracing::info!(id = %id, total = records.len(), "History record added");
                records
            }
            Err(e) if e.is_quota_exceeded() => {
                let keep = self.config.quota_fallback_records.max(1);
                tracing::warn!(
                    total = records.len(),
                    keep = keep,
                    "History over storage quota, dropping older records"
                );
                records.truncate(keep);

                match self.persist(&records).await {
                    Ok(()) => records,
                    Err(e) => {
                        tracing::error!(error = %e, "History could not be saved after trimming");
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                e.log();
                Vec::new()
            }
        }
    }

    /// Remove the record with `id`, if present
    ///
    /// Returns the remaining list, or an empty list when it could not be
    /// written back.
    pub async fn remove(&self, id: HistoryRecordId) -> Vec<HistoryRecord> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.list().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            tracing::debug!(id = %id, "History record not found");
            return records;
        }

        match self.persist(&records).await {
            Ok(()) => {
                tracing::info!(id = %id, total = records.len(), "History record removed");
                records
            }
            Err(e) => {
                e.log();
                Vec::new()
            }
        }
    }

    /// Drop the whole list
    pub async fn clear(&self) -> HistoryResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store
            .remove(&self.config.storage_key)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "History could not be cleared"))?;
        tracing::info!("History cleared");
        Ok(())
    }

    async fn compact(&self, mut input: NewHistoryRecord) -> NewHistoryRecord {
        input.artifact_data = self
            .compactor
            .compact(&input.artifact_data, self.config.artifact_profile)
            .await;
        if let Some(preview) = input.input_preview.take() {
            input.input_preview = Some(
                self.compactor
                    .compact(&preview, self.config.preview_profile)
                    .await,
            );
        }
        input
    }

    async fn load(&self) -> HistoryResult<Vec<HistoryRecord>> {
        match self.store.get(&self.config.storage_key).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn persist(&self, records: &[HistoryRecord]) -> HistoryResult<()> {
        let value = serde_json::to_value(records).map_err(HistoryError::Encoding)?;
        self.store.set(&self.config.storage_key, &value).await?;
        Ok(())
    }
}
