//! Repository traits for metadata operations.

pub mod boxes;
pub mod instances;
pub mod stamps;
pub mod stats;
pub mod tags;

pub use boxes::BoxRepo;
pub use instances::InstanceRepo;
pub use stamps::StampRepo;
pub use stats::StatsRepo;
pub use tags::TagRepo;
