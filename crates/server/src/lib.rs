//! HTTP server for the Stampkeeper collection manager.
//!
//! This crate provides the web surface:
//! - JSON API under `/api` (stamps, instances, boxes, tags, stats, preferences)
//! - HTML fragments under `/views` and `/htmx` for partial-page updates
//! - Preference cookie middleware
//! - Startup bootstrap (sample-data seeding)

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod preferences;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
