//! Remote Source Port
//!
//! The slow remote call a cache sits in front of.

use serde::Serialize;
use serde::de::DeserializeOwned;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote source trait
///
/// The `Send` variant is the one the cache takes, since background
/// refreshes run on spawned tasks.
#[trait_variant::make(RemoteSource: Send)]
pub trait LocalRemoteSource: Sync + 'static {
    type Output: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Fetch the current remote value
    async fn fetch(&self) -> Result<Self::Output, BoxError>;
}
