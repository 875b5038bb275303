//! Application Port Interfaces
//!
//! ## Organization
//!
//! - **registry/** - linkme slices for candidates, migration units and store providers
//! - **scan.rs** - the scanner seam consumed by the assembler
//! - **diagnostics.rs** - dependency graph rendering

/// Graph rendering port
pub mod diagnostics;
/// Compile-time registries
pub mod registry;
/// Scanner seam
pub mod scan;

pub use diagnostics::GraphRenderer;
pub use registry::{
    CandidateEntry, MigrationEntry, StoreProviderConfig, StoreProviderEntry, list_candidates,
    list_migrations, list_store_providers, registered_migrations, resolve_store_provider,
};
pub use scan::{ListScan, ScanResult, StaticScan};
