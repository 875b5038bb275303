//! In-memory store provider implementation
//!
//! Keeps tables in concurrent hash maps. Items inside a table are ordered by
//! (partition, sort) so the latest item of a partition is a range lookup.
//! Data is not persisted and will be lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use keel_application::ports::registry::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry,
};
use keel_domain::error::{Error, Result};
use keel_domain::ports::{
    Item, ItemKey, ItemValue, NativeClient, StoreProvider, TableKeySchema,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::constants::{STORE_MEMORY_DESCRIPTION, STORE_MEMORY_NAME};

type ItemMap = BTreeMap<(ItemValue, Option<ItemValue>), Item>;

struct Table {
    schema: TableKeySchema,
    items: ItemMap,
}

/// In-memory key-item store
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    namespace: Option<String>,
    tables: Arc<DashMap<String, Table>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose table names are prefixed with `namespace`
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Create a store from registry configuration
    pub fn from_config(config: &StoreProviderConfig) -> Self {
        match &config.namespace {
            Some(namespace) => Self::with_namespace(namespace.clone()),
            None => Self::new(),
        }
    }

    /// Handle exposing read-only inspection of the tables
    pub fn client(&self) -> InMemoryClient {
        InMemoryClient {
            namespace: self.namespace.clone(),
            tables: Arc::clone(&self.tables),
        }
    }

    fn qualified(&self, table: &str) -> String {
        qualify(self.namespace.as_deref(), table)
    }

    fn missing_table(table: &str) -> Error {
        Error::store(format!("table '{table}' does not exist"))
    }

    fn check_key(table: &str, schema: &TableKeySchema, key: &ItemKey) -> Result<()> {
        match (&schema.sort_key, &key.sort) {
            (Some(_), None) => Err(Error::store(format!(
                "table '{table}' requires a sort key value"
            ))),
            (None, Some(_)) => Err(Error::store(format!(
                "table '{table}' has no sort key"
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl StoreProvider for InMemoryStore {
    fn provider_name(&self) -> &str {
        STORE_MEMORY_NAME
    }

    async fn create_table(&self, name: &str, schema: &TableKeySchema) -> Result<bool> {
        let qualified = self.qualified(name);
        let table = self.tables.entry(qualified.clone()).or_insert_with(|| {
            debug!(table = %qualified, "Creating in-memory table");
            Table {
                schema: schema.clone(),
                items: ItemMap::new(),
            }
        });
        Ok(table.schema == *schema)
    }

    async fn get_item(&self, table: &str, key: &ItemKey) -> Result<Option<Item>> {
        let qualified = self.qualified(table);
        let entry = self
            .tables
            .get(&qualified)
            .ok_or_else(|| Self::missing_table(&qualified))?;
        Self::check_key(&qualified, &entry.schema, key)?;
        Ok(entry
            .items
            .get(&(key.partition.clone(), key.sort.clone()))
            .cloned())
    }

    async fn put_item(&self, table: &str, key: &ItemKey, fields: Item) -> Result<Item> {
        let qualified = self.qualified(table);
        let mut entry = self
            .tables
            .get_mut(&qualified)
            .ok_or_else(|| Self::missing_table(&qualified))?;
        Self::check_key(&qualified, &entry.schema, key)?;

        let mut item = fields;
        item.insert(entry.schema.partition_key.clone(), key.partition.clone());
        if let (Some(sort_key), Some(sort)) = (&entry.schema.sort_key, &key.sort) {
            item.insert(sort_key.clone(), sort.clone());
        }
        entry
            .items
            .insert((key.partition.clone(), key.sort.clone()), item.clone());
        Ok(item)
    }

    async fn latest_item(&self, table: &str, partition: &ItemValue) -> Result<Option<Item>> {
        let qualified = self.qualified(table);
        let entry = self
            .tables
            .get(&qualified)
            .ok_or_else(|| Self::missing_table(&qualified))?;
        Ok(entry
            .items
            .range((partition.clone(), None)..)
            .take_while(|((part, _), _)| part == partition)
            .last()
            .map(|(_, item)| item.clone()))
    }

    fn native_client(&self) -> Option<NativeClient> {
        Some(Arc::new(self.client()))
    }
}

fn qualify(namespace: Option<&str>, table: &str) -> String {
    match namespace {
        Some(namespace) => format!("{namespace}.{table}"),
        None => table.to_string(),
    }
}

/// Native client of [`InMemoryStore`], handed to migration units
///
/// Table names are the unqualified names the store's own methods take; the
/// namespace is applied the same way.
#[derive(Clone)]
pub struct InMemoryClient {
    namespace: Option<String>,
    tables: Arc<DashMap<String, Table>>,
}

impl InMemoryClient {
    /// Names of all tables in the store's namespace, sorted
    pub fn table_names(&self) -> Vec<String> {
        let prefix = qualify(self.namespace.as_deref(), "");
        let mut names: Vec<_> = self
            .tables
            .iter()
            .filter_map(|t| t.key().strip_prefix(&prefix).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// Number of items in a table, `None` if it does not exist
    pub fn item_count(&self, table: &str) -> Option<usize> {
        self.tables
            .get(&qualify(self.namespace.as_deref(), table))
            .map(|t| t.items.len())
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

/// Factory function for creating in-memory store instances.
fn in_memory_store_factory(
    config: &StoreProviderConfig,
) -> std::result::Result<Arc<dyn StoreProvider>, String> {
    Ok(Arc::new(InMemoryStore::from_config(config)))
}

#[linkme::distributed_slice(STORE_PROVIDERS)]
static MEMORY_PROVIDER: StoreProviderEntry = StoreProviderEntry {
    name: STORE_MEMORY_NAME,
    description: STORE_MEMORY_DESCRIPTION,
    factory: in_memory_store_factory,
};
