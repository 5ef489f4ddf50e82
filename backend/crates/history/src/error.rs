//! History Error Types
//!
//! These never reach `add`/`remove` callers directly (those degrade to an
//! empty list), but `clear` and internal persistence report them.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::store::StoreError;
use thiserror::Error;

/// History-specific result type alias
pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    /// Persisted list could not be encoded or decoded
    #[error("History encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl HistoryError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, HistoryError::Store(e) if e.is_quota_exceeded())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HistoryError::Store(StoreError::QuotaExceeded { .. }) => ErrorKind::QuotaExceeded,
            HistoryError::Store(StoreError::Serialization(_)) | HistoryError::Encoding(_) => {
                ErrorKind::Corrupted
            }
            HistoryError::Store(StoreError::Io(_)) => ErrorKind::Unavailable,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            HistoryError::Store(StoreError::QuotaExceeded { key, .. }) => {
                tracing::warn!(key = %key, "History storage quota exceeded");
            }
            HistoryError::Encoding(e) => {
                tracing::warn!(error = %e, "History list corrupt");
            }
            _ => {
                tracing::error!(error = %self, "History store error");
            }
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Store(e) => e.into(),
            HistoryError::Encoding(e) => {
                AppError::corrupted("Saved history is unreadable").with_source(e)
            }
        }
    }
}
