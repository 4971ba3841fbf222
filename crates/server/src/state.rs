//! Application state shared across handlers.

use stampkeeper_core::config::AppConfig;
use stampkeeper_metadata::MetadataStore;
use std::sync::Arc;

/// Shared state: configuration plus the metadata store handle. The database
/// is the sole source of truth; nothing is cached in memory.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create application state.
    pub fn new(config: AppConfig, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { config, metadata }
    }
}
