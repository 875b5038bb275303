//! Null store provider
//!
//! Accepts every table and write and remembers nothing. Lets `migrate` run
//! as a dry run: every unit is applied and nothing is recorded.

use async_trait::async_trait;
use keel_application::ports::registry::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry,
};
use keel_domain::error::Result;
use keel_domain::ports::{Item, ItemKey, ItemValue, StoreProvider, TableKeySchema};
use std::sync::Arc;

use crate::constants::{STORE_NULL_DESCRIPTION, STORE_NULL_NAME};

/// Store that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl NullStore {
    /// Create a null store
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreProvider for NullStore {
    fn provider_name(&self) -> &str {
        STORE_NULL_NAME
    }

    async fn create_table(&self, _name: &str, _schema: &TableKeySchema) -> Result<bool> {
        Ok(true)
    }

    async fn get_item(&self, _table: &str, _key: &ItemKey) -> Result<Option<Item>> {
        Ok(None)
    }

    async fn put_item(&self, _table: &str, _key: &ItemKey, fields: Item) -> Result<Item> {
        Ok(fields)
    }

    async fn latest_item(&self, _table: &str, _partition: &ItemValue) -> Result<Option<Item>> {
        Ok(None)
    }
}

fn null_store_factory(
    _config: &StoreProviderConfig,
) -> std::result::Result<Arc<dyn StoreProvider>, String> {
    Ok(Arc::new(NullStore::new()))
}

#[linkme::distributed_slice(STORE_PROVIDERS)]
static NULL_PROVIDER: StoreProviderEntry = StoreProviderEntry {
    name: STORE_NULL_NAME,
    description: STORE_NULL_DESCRIPTION,
    factory: null_store_factory,
};
