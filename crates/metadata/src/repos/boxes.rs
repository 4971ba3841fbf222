//! Storage box repository trait.

use crate::error::MetadataResult;
use crate::models::{BoxSummary, StorageBoxRow};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for storage boxes.
#[async_trait]
pub trait BoxRepo: Send + Sync {
    /// All boxes with their summed non-deleted instance quantities, by name.
    async fn list_boxes(&self) -> MetadataResult<Vec<BoxSummary>>;

    /// Get a box by id.
    async fn get_box(&self, id: Uuid) -> MetadataResult<Option<StorageBoxRow>>;

    /// Insert a new box. `Constraint` on a duplicate name.
    async fn create_box(&self, storage_box: &StorageBoxRow) -> MetadataResult<()>;

    /// Rename a box. `NotFound` when absent, `Constraint` on a duplicate name.
    async fn update_box(&self, storage_box: &StorageBoxRow) -> MetadataResult<()>;

    /// Null the box reference on all its instances, then hard-delete the box,
    /// in one transaction. The instances themselves are kept.
    async fn delete_box(&self, id: Uuid) -> MetadataResult<()>;
}
