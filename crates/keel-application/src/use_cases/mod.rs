//! Use Cases
//!
//! Application services that drive the domain through its ports.

/// Ordered migration runner
pub mod migration_runner;

pub use migration_runner::{MigrationReport, MigrationRunner, MigrationStage, record_from_item};
