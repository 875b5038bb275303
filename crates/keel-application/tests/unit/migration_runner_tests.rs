//! Tests for the migration runner
//!
//! Runs against the real in-memory store from keel-providers.

use async_trait::async_trait;
use keel_application::use_cases::{MigrationRunner, record_from_item};
use keel_domain::constants::MIGRATIONS_TABLE;
use keel_domain::ports::{
    Item, ItemKey, ItemValue, Migration, MigrationContext, StoreProvider, TableKeySchema,
};
use keel_domain::{ApplicationName, Error, MigrationRegistry, Result};
use keel_providers::{InMemoryClient, InMemoryStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<u32>>>;

struct Recording {
    index: u32,
    description: &'static str,
    journal: Journal,
}

#[async_trait]
impl Migration for Recording {
    fn index(&self) -> u32 {
        self.index
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn migrate(&self, context: &MigrationContext<'_>) -> Result<()> {
        assert!(context.native.is_some(), "in-memory store exposes a client");
        self.journal
            .lock()
            .map_err(|_| Error::generic("journal poisoned"))?
            .push(self.index);
        Ok(())
    }
}

struct Failing(u32);

#[async_trait]
impl Migration for Failing {
    fn index(&self) -> u32 {
        self.0
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn migrate(&self, _context: &MigrationContext<'_>) -> Result<()> {
        Err(Error::store("disk full"))
    }
}

/// Counts tracking records through the store's native client
struct CountsRecords {
    seen: Arc<Mutex<Option<usize>>>,
}

#[async_trait]
impl Migration for CountsRecords {
    fn index(&self) -> u32 {
        1
    }

    fn description(&self) -> &str {
        "count records"
    }

    async fn migrate(&self, context: &MigrationContext<'_>) -> Result<()> {
        let client = context
            .native
            .as_ref()
            .and_then(|native| native.downcast_ref::<InMemoryClient>())
            .ok_or_else(|| Error::generic("no in-memory client"))?;
        *self.seen.lock().map_err(|_| Error::generic("poisoned"))? =
            client.item_count(MIGRATIONS_TABLE);
        Ok(())
    }
}

/// Store whose tracking table can never be created
struct IncompatibleStore;

#[async_trait]
impl StoreProvider for IncompatibleStore {
    fn provider_name(&self) -> &str {
        "incompatible"
    }

    async fn create_table(&self, _name: &str, _schema: &TableKeySchema) -> Result<bool> {
        Ok(false)
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

/// Keeps exactly the fields it is given, never the key attributes
#[derive(Default)]
struct FieldsOnlyStore {
    items: Mutex<BTreeMap<(ItemValue, Option<ItemValue>), Item>>,
}

#[async_trait]
impl StoreProvider for FieldsOnlyStore {
    fn provider_name(&self) -> &str {
        "fields-only"
    }

    async fn create_table(&self, _name: &str, _schema: &TableKeySchema) -> Result<bool> {
        Ok(true)
    }

    async fn get_item(&self, _table: &str, key: &ItemKey) -> Result<Option<Item>> {
        let items = self.items.lock().map_err(|_| Error::store("poisoned"))?;
        Ok(items.get(&(key.partition.clone(), key.sort.clone())).cloned())
    }

    async fn put_item(&self, _table: &str, key: &ItemKey, fields: Item) -> Result<Item> {
        let mut items = self.items.lock().map_err(|_| Error::store("poisoned"))?;
        items.insert((key.partition.clone(), key.sort.clone()), fields.clone());
        Ok(fields)
    }

    async fn latest_item(&self, _table: &str, partition: &ItemValue) -> Result<Option<Item>> {
        let items = self.items.lock().map_err(|_| Error::store("poisoned"))?;
        Ok(items
            .iter()
            .filter(|((p, _), _)| p == partition)
            .max_by(|((_, a), _), ((_, b), _)| a.cmp(b))
            .map(|(_, item)| item.clone()))
    }
}

fn app() -> ApplicationName {
    ApplicationName::new("orders")
}

fn registry(indices: &[u32], journal: &Journal) -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    for &index in indices {
        registry
            .register(Arc::new(Recording {
                index,
                description: ["create table", "add column", "backfill"][index as usize % 3],
                journal: Arc::clone(journal),
            }))
            .expect("unique index");
    }
    registry
}

async fn seed_baseline(store: &InMemoryStore, index: u32) {
    store
        .create_table(MIGRATIONS_TABLE, &MigrationRunner::table_schema())
        .await
        .expect("table");
    let mut fields = Item::new();
    fields.insert("description".to_string(), ItemValue::S("seeded".to_string()));
    store
        .put_item(
            MIGRATIONS_TABLE,
            &ItemKey {
                partition: ItemValue::S("orders".to_string()),
                sort: Some(ItemValue::N(i64::from(index))),
            },
            fields,
        )
        .await
        .expect("seed");
}

#[tokio::test]
async fn test_fresh_store_applies_everything_in_order() {
    let store = Arc::new(InMemoryStore::new());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());

    let report = runner
        .run(&app(), &registry(&[2, 0, 1], &journal))
        .await
        .expect("run");

    assert_eq!(report.baseline, None);
    assert_eq!(report.applied, vec![0, 1, 2]);
    assert_eq!(report.skipped, 0);
    assert_eq!(*journal.lock().expect("journal"), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_second_run_applies_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());
    let units = registry(&[0, 1, 2], &journal);

    let first = runner.run(&app(), &units).await.expect("first run");
    let second = runner.run(&app(), &units).await.expect("second run");

    assert_eq!(first.current_index(), Some(2));
    assert_eq!(second.baseline, Some(2));
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped, 3);
    assert_eq!(journal.lock().expect("journal").len(), 3);
}

#[tokio::test]
async fn test_only_units_above_baseline_run_and_each_is_recorded() {
    let store = Arc::new(InMemoryStore::new());
    seed_baseline(&store, 0).await;
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());

    let report = runner
        .run(&app(), &registry(&[0, 1, 2], &journal))
        .await
        .expect("run");

    assert_eq!(report.baseline, Some(0));
    assert_eq!(report.applied, vec![1, 2]);
    assert_eq!(*journal.lock().expect("journal"), vec![1, 2]);

    let records = runner.applied_records(&app()).await.expect("records");
    let described: Vec<_> = records
        .iter()
        .map(|r| (r.index, r.description.as_str()))
        .collect();
    assert_eq!(
        described,
        vec![(0, "seeded"), (1, "add column"), (2, "backfill")]
    );
    assert!(records[1].applied_at.is_some());
}

#[tokio::test]
async fn test_incompatible_table_fails_before_any_unit() {
    let journal = Journal::default();
    let runner = MigrationRunner::new(Arc::new(IncompatibleStore));

    let error = runner
        .run(&app(), &registry(&[0, 1], &journal))
        .await
        .expect_err("table cannot be created");

    assert!(matches!(error, Error::MigrationTable { .. }));
    assert!(journal.lock().expect("journal").is_empty());
}

#[tokio::test]
async fn test_failing_unit_halts_run_and_keeps_prior_records() {
    let store = Arc::new(InMemoryStore::new());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());
    let mut units = registry(&[0, 2], &journal);
    units.register(Arc::new(Failing(1))).expect("register");

    let error = runner.run(&app(), &units).await.expect_err("unit 1 fails");
    match &error {
        Error::MigrationApply {
            index, description, ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(description, "always fails");
        }
        other => panic!("Expected MigrationApply, got {other}"),
    }
    assert_eq!(*journal.lock().expect("journal"), vec![0]);

    let records = runner.applied_records(&app()).await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].index, 0);
}

#[tokio::test]
async fn test_applications_are_tracked_independently() {
    let store = Arc::new(InMemoryStore::new());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());
    let units = registry(&[0, 1], &journal);

    runner.run(&app(), &units).await.expect("orders");
    let billing = runner
        .run(&ApplicationName::new("billing"), &units)
        .await
        .expect("billing");

    assert_eq!(billing.baseline, None);
    assert_eq!(billing.applied, vec![0, 1]);
}

#[tokio::test]
async fn test_malformed_record_is_fatal() {
    let store = Arc::new(InMemoryStore::new());
    store
        .create_table(MIGRATIONS_TABLE, &MigrationRunner::table_schema())
        .await
        .expect("table");
    store
        .put_item(
            MIGRATIONS_TABLE,
            &ItemKey {
                partition: ItemValue::S("orders".to_string()),
                sort: Some(ItemValue::N(4)),
            },
            Item::new(),
        )
        .await
        .expect("put");

    let journal = Journal::default();
    let error = MigrationRunner::new(store)
        .run(&app(), &registry(&[5], &journal))
        .await
        .expect_err("record without description");

    assert!(matches!(error, Error::MigrationTable { .. }));
    assert!(error.to_string().contains("malformed"));
    assert!(journal.lock().expect("journal").is_empty());
}

#[tokio::test]
async fn test_custom_table_name() {
    let store = Arc::new(InMemoryStore::new());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone()).with_table("schema_history");
    runner
        .run(&app(), &registry(&[0], &journal))
        .await
        .expect("run");

    let latest = store
        .latest_item("schema_history", &ItemValue::S("orders".to_string()))
        .await
        .expect("read")
        .expect("recorded");
    assert_eq!(record_from_item(&latest).expect("record").index, 0);
}

#[test]
fn test_record_from_item_rejects_negative_index() {
    let mut item = Item::new();
    item.insert("application".to_string(), ItemValue::S("orders".to_string()));
    item.insert("migration_index".to_string(), ItemValue::N(-1));
    item.insert("description".to_string(), ItemValue::S("x".to_string()));
    assert!(record_from_item(&item).is_err());
}

#[tokio::test]
async fn test_records_carry_their_key_attributes() {
    let store = Arc::new(FieldsOnlyStore::default());
    let journal = Journal::default();
    let runner = MigrationRunner::new(store.clone());
    let units = registry(&[0, 1], &journal);

    runner.run(&app(), &units).await.expect("first run");
    let second = runner.run(&app(), &units).await.expect("second run");

    assert_eq!(second.baseline, Some(1));
    assert!(second.applied.is_empty());
    let records = runner.applied_records(&app()).await.expect("records");
    let indices: Vec<_> = records.iter().map(|r| (r.application.as_str(), r.index)).collect();
    assert_eq!(indices, vec![("orders", 0), ("orders", 1)]);
}

#[tokio::test]
async fn test_native_client_resolves_namespaced_tables() {
    let store = Arc::new(InMemoryStore::with_namespace("prod"));
    let journal = Journal::default();
    let seen = Arc::new(Mutex::new(None));
    let mut units = registry(&[0], &journal);
    units
        .register(Arc::new(CountsRecords {
            seen: Arc::clone(&seen),
        }))
        .expect("register");

    MigrationRunner::new(store)
        .run(&app(), &units)
        .await
        .expect("run");

    assert_eq!(*seen.lock().expect("seen"), Some(1));
}
