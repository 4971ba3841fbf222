//! Stamp instance repository trait.

use crate::error::MetadataResult;
use crate::models::{InstanceDetails, InstanceRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for grouped physical copies of a design.
#[async_trait]
pub trait InstanceRepo: Send + Sync {
    /// Insert a new instance. `Constraint` when a non-deleted instance with
    /// the same (stamp, condition, box) key already exists.
    async fn create_instance(&self, instance: &InstanceRow) -> MetadataResult<()>;

    /// Get an instance with its box name resolved; `None` when absent or
    /// soft-deleted.
    async fn get_instance(&self, id: Uuid) -> MetadataResult<Option<InstanceDetails>>;

    /// All non-deleted instances of a design, ordered by condition then box
    /// name (NULLS LAST).
    async fn list_instances_for_stamp(
        &self,
        stamp_id: Uuid,
    ) -> MetadataResult<Vec<InstanceDetails>>;

    /// Overwrite an instance's mutable columns. `NotFound` when absent or
    /// soft-deleted; `Constraint` when the change collides with another
    /// live instance's (stamp, condition, box) key.
    async fn update_instance(&self, instance: &InstanceRow) -> MetadataResult<()>;

    /// Soft-delete an instance. `NotFound` when absent or already deleted.
    async fn delete_instance(&self, id: Uuid, deleted_at: OffsetDateTime) -> MetadataResult<()>;
}
