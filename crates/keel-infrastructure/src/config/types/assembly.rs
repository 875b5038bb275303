//! Assembly and migration configuration types

use keel_domain::constants::MIGRATIONS_TABLE;
use serde::{Deserialize, Serialize};

/// How the container is assembled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Install override modules, replacing earlier registrations of the same keys
    pub override_mode: bool,

    /// Render the dependency graph to the log instead of discarding it
    pub render_graph: bool,

    /// Resolve every binding right after finalize so wiring errors surface at startup
    pub eager_validation: bool,
}

/// Migration runner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Whether `migrate` runs at all
    pub enabled: bool,

    /// Tracking table name
    pub table_name: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            table_name: MIGRATIONS_TABLE.to_string(),
        }
    }
}
