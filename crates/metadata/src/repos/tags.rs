//! Tag repository trait.

use crate::error::MetadataResult;
use crate::models::{TagRow, TagSummary};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for tags.
#[async_trait]
pub trait TagRepo: Send + Sync {
    /// All tags with the number of designs carrying each, by name.
    async fn list_tags(&self) -> MetadataResult<Vec<TagSummary>>;

    /// Insert a new tag. `Constraint` on a duplicate name.
    async fn create_tag(&self, tag: &TagRow) -> MetadataResult<()>;

    /// Rename a tag. `NotFound` when absent, `Constraint` on a duplicate name.
    async fn update_tag(&self, tag: &TagRow) -> MetadataResult<()>;

    /// Hard-delete a tag and its stamp links, in one transaction.
    async fn delete_tag(&self, id: Uuid) -> MetadataResult<()>;
}
