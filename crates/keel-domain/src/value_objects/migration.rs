//! Migration tracking records and the migrations sub-container

use crate::error::{Error, Result};
use crate::ports::Migration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Resolved name of the application being assembled
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationName(String);

impl ApplicationName {
    /// Create an application name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One applied migration as stored in the tracking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Application the migration belongs to
    pub application: String,
    /// Index of the applied unit
    pub index: u32,
    /// Description of the applied unit
    pub description: String,
    /// When the unit completed
    pub applied_at: Option<DateTime<Utc>>,
}

/// Registered migration units ordered by index
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    units: BTreeMap<u32, Arc<dyn Migration>>,
}

impl MigrationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit; a second unit with the same index is a conflict
    pub fn register(&mut self, unit: Arc<dyn Migration>) -> Result<()> {
        let index = unit.index();
        if let Some(existing) = self.units.get(&index) {
            return Err(Error::binding_conflict(
                format!("migration #{index}"),
                existing.description(),
                unit.description(),
            ));
        }
        self.units.insert(index, unit);
        Ok(())
    }

    /// Units in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Migration>> {
        self.units.values()
    }

    /// Highest registered index
    pub fn last_index(&self) -> Option<u32> {
        self.units.keys().next_back().copied()
    }

    /// Number of registered units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.units.iter().map(|(index, unit)| (index, unit.description())))
            .finish()
    }
}
