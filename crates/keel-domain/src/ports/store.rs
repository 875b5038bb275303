//! Store Port
//!
//! The narrow key-item contract the migration runner needs from a persistent
//! store. Tables have a partition key and an optional sort key; items are
//! flat attribute maps.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemValue {
    /// String
    S(String),
    /// Number
    N(i64),
    /// Boolean
    Bool(bool),
}

impl ItemValue {
    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric payload, if any
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::N(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(value) => write!(f, "{value}"),
            Self::N(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A stored item
pub type Item = BTreeMap<String, ItemValue>;

/// Key schema of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableKeySchema {
    /// Partition (hash) key attribute
    pub partition_key: String,
    /// Sort (range) key attribute
    pub sort_key: Option<String>,
}

impl TableKeySchema {
    /// Schema with a partition key and a sort key
    pub fn composite<P: Into<String>, S: Into<String>>(partition_key: P, sort_key: S) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: Some(sort_key.into()),
        }
    }
}

/// Primary key of one item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Partition key value
    pub partition: ItemValue,
    /// Sort key value
    pub sort: Option<ItemValue>,
}

/// Backend-specific client handle, for migrations that need it
pub type NativeClient = Arc<dyn Any + Send + Sync>;

/// Key-item store used by the migration runner
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// Registry name of the provider
    fn provider_name(&self) -> &str;

    /// Create a table if absent
    ///
    /// Returns `true` when the table exists with `schema` afterwards and
    /// `false` when a table of that name exists with a different schema.
    async fn create_table(&self, name: &str, schema: &TableKeySchema) -> Result<bool>;

    /// Read one item
    async fn get_item(&self, table: &str, key: &ItemKey) -> Result<Option<Item>>;

    /// Write one item, returning it as stored (key attributes included)
    async fn put_item(&self, table: &str, key: &ItemKey, fields: Item) -> Result<Item>;

    /// Item with the highest sort key in a partition
    async fn latest_item(&self, table: &str, partition: &ItemValue) -> Result<Option<Item>>;

    /// Backend client handle, if the provider has one
    fn native_client(&self) -> Option<NativeClient> {
        None
    }
}
