//! Migration Unit Registry
//!
//! Migration units linked into the binary register themselves here and are
//! collected into the migrations sub-container during MAIN_INSTALL.

use std::sync::Arc;

use keel_domain::MigrationRegistry;
use keel_domain::error::{Error, Result};
use keel_domain::ports::Migration;

/// Registry entry for migration units
pub struct MigrationEntry {
    /// Index the unit declares
    pub index: u32,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the unit
    pub factory: fn() -> Arc<dyn Migration>,
}

#[linkme::distributed_slice]
pub static MIGRATIONS: [MigrationEntry] = [..];

/// Build a registry from every linked migration unit
///
/// An entry whose unit reports a different index than the entry declares is
/// rejected, as is a second unit for an index already taken.
pub fn registered_migrations() -> Result<MigrationRegistry> {
    let mut registry = MigrationRegistry::new();
    for entry in MIGRATIONS {
        let unit = (entry.factory)();
        if unit.index() != entry.index {
            return Err(Error::classification(
                entry.description,
                format!(
                    "registered as migration #{} but reports index {}",
                    entry.index,
                    unit.index()
                ),
            ));
        }
        registry.register(unit)?;
    }
    Ok(registry)
}

/// List all linked migration units as (index, description) pairs, by index
pub fn list_migrations() -> Vec<(u32, &'static str)> {
    let mut units: Vec<_> = MIGRATIONS
        .iter()
        .map(|e| (e.index, e.description))
        .collect();
    units.sort_unstable();
    units
}
