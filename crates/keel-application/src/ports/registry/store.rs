//! Store Provider Registry
//!
//! Auto-registration system for store providers.
//! Providers register themselves via `#[linkme::distributed_slice]` and are
//! resolved by the name configured under `[store] provider`.

use std::collections::HashMap;
use std::sync::Arc;

use keel_domain::ports::StoreProvider;
use serde::{Deserialize, Serialize};

/// Configuration for store provider creation
///
/// Providers use what they need and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProviderConfig {
    /// Provider name (e.g., "memory")
    pub provider: String,
    /// Table name prefix shared by every table the provider creates
    pub namespace: Option<String>,
    /// Additional provider-specific configuration
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl StoreProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add extra configuration
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for store providers
pub struct StoreProviderEntry {
    /// Unique provider name (e.g., "memory")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instance
    pub factory: fn(&StoreProviderConfig) -> Result<Arc<dyn StoreProvider>, String>,
}

#[linkme::distributed_slice]
pub static STORE_PROVIDERS: [StoreProviderEntry] = [..];

/// Resolve store provider by name from registry
///
/// # Returns
/// * `Ok(Arc<dyn StoreProvider>)` - Created provider instance
/// * `Err(String)` - Error message if provider not found or creation failed
pub fn resolve_store_provider(
    config: &StoreProviderConfig,
) -> Result<Arc<dyn StoreProvider>, String> {
    let provider_name = &config.provider;

    for entry in STORE_PROVIDERS {
        if entry.name == provider_name {
            return (entry.factory)(config);
        }
    }

    let available: Vec<&str> = STORE_PROVIDERS.iter().map(|e| e.name).collect();

    Err(format!(
        "Unknown store provider '{provider_name}'. Available providers: {available:?}"
    ))
}

/// List all registered store providers as (name, description) pairs
pub fn list_store_providers() -> Vec<(&'static str, &'static str)> {
    STORE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
