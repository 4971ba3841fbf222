//! Stamp design repository trait.

use crate::error::MetadataResult;
use crate::models::{StampDetails, StampRow};
use async_trait::async_trait;
use stampkeeper_core::listing::StampFilters;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for stamp designs.
#[async_trait]
pub trait StampRepo: Send + Sync {
    /// One page of designs matching `filters`, each composed with its tags,
    /// non-deleted instances, and distinct box names.
    async fn list_stamps(&self, filters: &StampFilters) -> MetadataResult<Vec<StampDetails>>;

    /// Total number of distinct designs matching `filters`. Sort and
    /// pagination fields are ignored; the remaining predicates mirror
    /// [`list_stamps`](Self::list_stamps) exactly so the two always agree
    /// on cardinality.
    async fn count_stamps(&self, filters: &StampFilters) -> MetadataResult<i64>;

    /// Get a design by id; `None` when absent or soft-deleted.
    async fn get_stamp(&self, id: Uuid) -> MetadataResult<Option<StampDetails>>;

    /// Insert a new design and attach `tags` (created on demand).
    async fn create_stamp(&self, stamp: &StampRow, tags: &[String]) -> MetadataResult<()>;

    /// Overwrite a design's mutable columns. `NotFound` when the design is
    /// absent or soft-deleted.
    async fn update_stamp(&self, stamp: &StampRow) -> MetadataResult<()>;

    /// Soft-delete a design: stamps its non-deleted instances and itself
    /// with `deleted_at` and removes its tag links, in one transaction.
    async fn delete_stamp(&self, id: Uuid, deleted_at: OffsetDateTime) -> MetadataResult<()>;

    /// Replace the design's tag set atomically. Names are trimmed, empty
    /// names skipped, missing tags created; duplicate links are tolerated
    /// silently. Any other failure rolls the whole reconciliation back.
    async fn set_stamp_tags(&self, stamp_id: Uuid, tags: &[String]) -> MetadataResult<()>;
}
