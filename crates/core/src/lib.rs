//! Shared types for Stampkeeper.
//!
//! This crate holds the pieces every other crate needs but that do no I/O:
//! - Application configuration ([`config`])
//! - Listing vocabulary: sort keys, ownership filter, pagination ([`listing`])
//! - User display preferences and their cookie codec ([`preferences`])

pub mod config;
pub mod listing;
pub mod preferences;

pub use config::{AppConfig, MetadataConfig, SeedConfig, ServerConfig};
pub use listing::{OwnedFilter, SortDirection, SortKey, StampFilters};
pub use preferences::UserPreferences;
