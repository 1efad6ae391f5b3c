use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{FetchError, FetchKey};
use crate::item::RawTrackedItem;

/// Source of list data.
///
/// Implementations should stop work and return [`FetchError::Cancelled`]
/// once `cancel` fires. The controller discards late results regardless.
#[async_trait]
pub trait ListFetcher: Send + Sync {
    async fn fetch(
        &self,
        key: &FetchKey,
        cancel: CancellationToken,
    ) -> Result<Vec<RawTrackedItem>, FetchError>;
}
