//! Store module
//!
//! Resolves the configured store provider through the linkme registry and
//! binds it as `Arc<dyn StoreProvider>`. An override module binding its own
//! `dyn StoreProvider` replaces it.

use crate::config::StoreConfig;
use keel_application::ports::registry::resolve_store_provider;
use keel_domain::error::{Error, Result};
use keel_domain::ports::{Binder, BinderExt, Module, StoreProvider};
use tracing::info;

/// Binds the store selected by `StoreConfig`
#[derive(Debug, Default)]
pub struct StoreModule;

impl Module for StoreModule {
    fn name(&self) -> &str {
        "store"
    }

    fn configure(&self, binder: &mut dyn Binder) -> Result<()> {
        let store_config = binder.bound::<StoreConfig>().ok_or_else(|| {
            Error::phase("store configuration must be bound before the store module runs")
        })?;
        let provider = resolve_store_provider(&store_config.to_provider_config())
            .map_err(Error::configuration)?;
        info!(provider = provider.provider_name(), "Store provider selected");
        binder.bind_arc::<dyn StoreProvider>(provider)
    }
}
