//! Cache Error Types

use crate::domain::source::BoxError;
use kernel::error::app_error::AppError;
use platform::store::StoreError;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Synchronous remote fetch failed
    #[error("Remote fetch failed: {0}")]
    Fetch(#[source] BoxError),

    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Fetch(source) => AppError::upstream("Listing is unavailable right now")
                .with_action("Try again in a moment")
                .with_boxed_source(source),
            CacheError::Store(e) => e.into(),
        }
    }
}
