//! Key-Value Store Infrastructure
//!
//! Durable local storage port shared by the cache and the history store,
//! plus two implementations: in-memory and one-file-per-key on disk.
//! Values are JSON; each key is read and written as a unit.

use kernel::error::app_error::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend has no room for the write
    #[error("Storage quota exceeded writing '{key}': {reason}")]
    QuotaExceeded { key: String, reason: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored bytes are not valid JSON, or the value could not be encoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }

    fn from_io(key: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::StorageFull {
            StoreError::QuotaExceeded {
                key: key.to_string(),
                reason: err.to_string(),
            }
        } else {
            StoreError::Io(err)
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QuotaExceeded { key, reason } => {
                AppError::quota_exceeded(format!("Storage quota exceeded writing '{}': {}", key, reason))
                    .with_action("Remove some saved items and try again")
            }
            StoreError::Io(e) => AppError::from(e),
            StoreError::Serialization(e) => AppError::from(e),
        }
    }
}

/// Key-value store trait
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Read the value under `key`; `None` when absent
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Replace the value under `key`
    async fn set(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store holding serialized JSON strings
///
/// An optional byte quota counts `key.len() + value.len()` over all keys.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Store raw text under `key`, bypassing JSON encoding
    pub fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.into());
    }

    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + raw.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    reason: format!("{} bytes needed, {} allowed", needed, limit),
                });
            }
        }

        entries.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

const VALUE_EXTENSION: &str = "json";

/// One JSON file per key under a root directory
///
/// Writes go to a unique temp file which is then renamed over the target,
/// so a reader sees either the old or the new value. Writes and removals
/// are serialized so the quota check holds across keys.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    quota_bytes: Option<u64>,
    write_seq: AtomicU64,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "File store opened");
        Ok(Self {
            root,
            quota_bytes: None,
            write_seq: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        })
    }

    /// Cap the total size of stored values
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.{}", name, VALUE_EXTENSION))
    }

    /// Total size of stored values other than `exclude`
    async fn used_bytes_excluding(&self, exclude: &Path) -> io::Result<u64> {
        let mut total = 0;
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path == exclude
                || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION)
            {
                continue;
            }
            total += entry.metadata().await?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let path = self.path_for(key);
        let _guard = self.write_lock.lock().await;

        if let Some(limit) = self.quota_bytes {
            let others = self.used_bytes_excluding(&path).await?;
            let needed = others + bytes.len() as u64;
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    reason: format!("{} bytes needed, {} allowed", needed, limit),
                });
            }
        }

        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{}.tmp", VALUE_EXTENSION, seq));
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::from_io(key, e));
        }
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::from_io(key, e))?;

        tracing::trace!(key = key, bytes = bytes.len(), "Value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
