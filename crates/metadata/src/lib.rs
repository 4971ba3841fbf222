//! Data model and store implementations for Stampkeeper.
//!
//! This crate provides the collection data plane:
//! - Stamp designs, physical instances, storage boxes, and tags
//! - Soft-delete lifecycle for designs and instances
//! - Dynamic listing queries (filter / search / sort / pagination)
//! - Collection statistics

pub mod error;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use postgres::PostgresStore;
pub use store::{MetadataStore, SqliteStore};

use stampkeeper_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
        MetadataConfig::Postgres {
            url,
            max_connections,
        } => {
            tracing::info!("Connecting to PostgreSQL");
            let store = PostgresStore::from_url(url, *max_connections).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
