//! Collection statistics repository trait.

use crate::error::MetadataResult;
use crate::models::CollectionStats;
use async_trait::async_trait;

/// Aggregate counts over the collection.
#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn collection_stats(&self) -> MetadataResult<CollectionStats>;
}
