//! Migration Port
//!
//! A migration unit is a versioned mutation applied at most once per
//! application. Units are executed strictly one at a time in index order.

use crate::error::Result;
use crate::ports::store::{NativeClient, StoreProvider};
use crate::value_objects::ApplicationName;
use async_trait::async_trait;

/// What a migration unit can touch while it runs
pub struct MigrationContext<'a> {
    /// The application being migrated
    pub application: &'a ApplicationName,
    /// The store the tracking table lives in
    pub store: &'a dyn StoreProvider,
    /// The store's native client, where the provider exposes one
    pub native: Option<NativeClient>,
}

/// One versioned, indexed mutation
#[async_trait]
pub trait Migration: Send + Sync {
    /// Stable index; later units have higher indices
    fn index(&self) -> u32;

    /// Recorded alongside the index once the unit completes
    fn description(&self) -> &str;

    /// Apply the mutation
    async fn migrate(&self, context: &MigrationContext<'_>) -> Result<()>;
}
