//! Store configuration types

use crate::constants::DEFAULT_STORE_PROVIDER;
use keel_application::ports::registry::StoreProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which store backs the migration runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Registered provider name, e.g. `memory`
    pub provider: String,

    /// Prefix applied to every table name
    pub namespace: Option<String>,

    /// Provider-specific settings
    pub extra: HashMap<String, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_STORE_PROVIDER.to_string(),
            namespace: None,
            extra: HashMap::new(),
        }
    }
}

impl StoreConfig {
    /// Registry configuration for the selected provider
    pub fn to_provider_config(&self) -> StoreProviderConfig {
        let config = StoreProviderConfig::new(&self.provider);
        let config = match &self.namespace {
            Some(namespace) => config.with_namespace(namespace),
            None => config,
        };
        self.extra
            .iter()
            .fold(config, |config, (key, value)| config.with_extra(key, value))
    }
}
