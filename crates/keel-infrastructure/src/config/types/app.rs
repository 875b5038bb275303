//! Main application configuration

use super::{AssemblyConfig, LoggingConfig, MigrationsConfig, StoreConfig};
use crate::constants::DEFAULT_APPLICATION_NAME;
use keel_domain::ApplicationName;
use serde::{Deserialize, Serialize};

/// Application identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Name scoping bindings and migration records
    pub name: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application identity
    pub application: ApplicationConfig,

    /// Container assembly
    pub assembly: AssemblyConfig,

    /// Migration runner
    pub migrations: MigrationsConfig,

    /// Store selection
    pub store: StoreConfig,

    /// Logging
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// The configured application name
    pub fn application_name(&self) -> ApplicationName {
        ApplicationName::new(&self.application.name)
    }
}
