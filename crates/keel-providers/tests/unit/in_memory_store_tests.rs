//! Tests for the in-memory store

use keel_domain::ports::{Item, ItemKey, ItemValue, StoreProvider, TableKeySchema};
use keel_providers::InMemoryStore;
use keel_providers::store::InMemoryClient;

fn schema() -> TableKeySchema {
    TableKeySchema::composite("app", "seq")
}

fn key(app: &str, seq: i64) -> ItemKey {
    ItemKey {
        partition: ItemValue::S(app.to_string()),
        sort: Some(ItemValue::N(seq)),
    }
}

fn fields(note: &str) -> Item {
    let mut item = Item::new();
    item.insert("note".to_string(), ItemValue::S(note.to_string()));
    item
}

#[tokio::test]
async fn test_create_table_is_idempotent() {
    let store = InMemoryStore::new();
    assert!(store.create_table("t", &schema()).await.expect("create"));
    assert!(store.create_table("t", &schema()).await.expect("create again"));
}

#[tokio::test]
async fn test_create_table_with_different_schema_returns_false() {
    let store = InMemoryStore::new();
    store.create_table("t", &schema()).await.expect("create");
    let other = TableKeySchema {
        partition_key: "app".to_string(),
        sort_key: None,
    };
    assert!(!store.create_table("t", &other).await.expect("create"));
}

#[tokio::test]
async fn test_put_returns_item_with_key_attributes() {
    let store = InMemoryStore::new();
    store.create_table("t", &schema()).await.expect("create");
    let stored = store
        .put_item("t", &key("orders", 3), fields("hello"))
        .await
        .expect("put");
    assert_eq!(stored.get("app"), Some(&ItemValue::S("orders".to_string())));
    assert_eq!(stored.get("seq"), Some(&ItemValue::N(3)));
    assert_eq!(stored.get("note"), Some(&ItemValue::S("hello".to_string())));

    let read = store.get_item("t", &key("orders", 3)).await.expect("get");
    assert_eq!(read, Some(stored));
    assert_eq!(store.get_item("t", &key("orders", 4)).await.expect("get"), None);
}

#[tokio::test]
async fn test_latest_item_is_highest_sort_key_in_partition() {
    let store = InMemoryStore::new();
    store.create_table("t", &schema()).await.expect("create");
    for seq in [2, 10, 1] {
        store
            .put_item("t", &key("orders", seq), fields("o"))
            .await
            .expect("put");
    }
    store
        .put_item("t", &key("users", 99), fields("u"))
        .await
        .expect("put");

    let latest = store
        .latest_item("t", &ItemValue::S("orders".to_string()))
        .await
        .expect("latest")
        .expect("some item");
    assert_eq!(latest.get("seq"), Some(&ItemValue::N(10)));

    let none = store
        .latest_item("t", &ItemValue::S("billing".to_string()))
        .await
        .expect("latest");
    assert!(none.is_none());
}

#[tokio::test]
async fn test_missing_table_is_store_error() {
    let store = InMemoryStore::new();
    let error = store
        .get_item("absent", &key("a", 1))
        .await
        .expect_err("missing table");
    assert!(error.to_string().contains("absent"));
}

#[tokio::test]
async fn test_key_shape_must_match_schema() {
    let store = InMemoryStore::new();
    store.create_table("t", &schema()).await.expect("create");
    let partial = ItemKey {
        partition: ItemValue::S("orders".to_string()),
        sort: None,
    };
    assert!(store.put_item("t", &partial, Item::new()).await.is_err());
}

#[tokio::test]
async fn test_client_names_tables_like_the_store_does() {
    let store = InMemoryStore::with_namespace("prod");
    store.create_table("t", &schema()).await.expect("create");
    store
        .put_item("t", &key("orders", 1), fields("o"))
        .await
        .expect("put");

    let native = store.native_client().expect("native client");
    let client = native
        .downcast_ref::<InMemoryClient>()
        .expect("in-memory client");
    assert_eq!(client.table_names(), vec!["t".to_string()]);
    assert_eq!(client.item_count("t"), Some(1));
    assert_eq!(client.item_count("prod.t"), None);
}
