//! Migration Runner Use Case
//!
//! Applies registered migration units to a store, recording each completed
//! unit in a tracking table partitioned by application name and sorted by
//! migration index.
//!
//! ```text
//! ENSURE_TABLE → DETERMINE_BASELINE → SELECT_PENDING → APPLY_EACH → DONE
//! ```
//!
//! Units run strictly one at a time in ascending index order. A unit whose
//! index is at or below the recorded baseline is never invoked again. The
//! first failing unit halts the run; every unit before it stays recorded,
//! so the run can be repeated once the unit is fixed.

use chrono::{DateTime, Utc};
use keel_domain::constants::{
    MIGRATION_FIELD_APPLICATION, MIGRATION_FIELD_APPLIED_AT, MIGRATION_FIELD_DESCRIPTION,
    MIGRATION_FIELD_INDEX, MIGRATIONS_TABLE,
};
use keel_domain::error::{Error, Result};
use keel_domain::ports::{
    Item, ItemKey, ItemValue, Migration, MigrationContext, StoreProvider, TableKeySchema,
};
use keel_domain::{ApplicationName, MigrationRecord, MigrationRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Stages of one migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStage {
    /// Create the tracking table if absent
    EnsureTable,
    /// Read the highest recorded index
    DetermineBaseline,
    /// Pick units above the baseline
    SelectPending,
    /// Run and record each pending unit
    ApplyEach,
    /// Finished
    Done,
}

impl fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnsureTable => "ENSURE_TABLE",
            Self::DetermineBaseline => "DETERMINE_BASELINE",
            Self::SelectPending => "SELECT_PENDING",
            Self::ApplyEach => "APPLY_EACH",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Application that was migrated
    pub application: String,
    /// Highest index recorded before the run, `None` when nothing was applied yet
    pub baseline: Option<u32>,
    /// Indices applied by this run, in order
    pub applied: Vec<u32>,
    /// Registered units skipped because they were already recorded
    pub skipped: usize,
}

impl MigrationReport {
    /// Highest recorded index after the run
    pub fn current_index(&self) -> Option<u32> {
        self.applied.last().copied().or(self.baseline)
    }
}

/// Runs migration units against a store
pub struct MigrationRunner {
    store: Arc<dyn StoreProvider>,
    table: String,
}

impl MigrationRunner {
    /// Runner tracking progress in the default table
    pub fn new(store: Arc<dyn StoreProvider>) -> Self {
        Self {
            store,
            table: MIGRATIONS_TABLE.to_string(),
        }
    }

    /// Use a different tracking table
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Tracking table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Key schema of the tracking table
    pub fn table_schema() -> TableKeySchema {
        TableKeySchema::composite(MIGRATION_FIELD_APPLICATION, MIGRATION_FIELD_INDEX)
    }

    /// Apply every pending unit of `registry` for `application`
    pub async fn run(
        &self,
        application: &ApplicationName,
        registry: &MigrationRegistry,
    ) -> Result<MigrationReport> {
        self.enter(MigrationStage::EnsureTable, application);
        self.ensure_table().await?;

        self.enter(MigrationStage::DetermineBaseline, application);
        let baseline = self.baseline(application).await?;

        self.enter(MigrationStage::SelectPending, application);
        let pending = Self::select_pending(registry, baseline);
        let skipped = registry.len() - pending.len();
        info!(
            application = %application,
            baseline = ?baseline,
            pending = pending.len(),
            skipped,
            "Selected pending migrations"
        );

        self.enter(MigrationStage::ApplyEach, application);
        let mut applied = Vec::with_capacity(pending.len());
        for unit in pending {
            self.apply(application, unit.as_ref()).await?;
            applied.push(unit.index());
        }

        self.enter(MigrationStage::Done, application);
        Ok(MigrationReport {
            application: application.to_string(),
            baseline,
            applied,
            skipped,
        })
    }

    /// Every record stored for `application`, in index order
    ///
    /// Reads records one index at a time up to the recorded baseline.
    pub async fn applied_records(
        &self,
        application: &ApplicationName,
    ) -> Result<Vec<MigrationRecord>> {
        let Some(last) = self.baseline(application).await? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for index in 0..=last {
            let key = record_key(application, index);
            let item = self
                .store
                .get_item(&self.table, &key)
                .await
                .map_err(|e| self.table_error("cannot read migration record", e))?;
            if let Some(item) = item {
                records.push(record_from_item(&item)?);
            }
        }
        Ok(records)
    }

    fn enter(&self, stage: MigrationStage, application: &ApplicationName) {
        debug!(stage = %stage, application = %application, table = %self.table, "Migration stage");
    }

    fn table_error(&self, message: &str, source: Error) -> Error {
        Error::migration_table_with_source(format!("{message} in '{}'", self.table), source)
    }

    async fn ensure_table(&self) -> Result<()> {
        let created = self
            .store
            .create_table(&self.table, &Self::table_schema())
            .await
            .map_err(|e| self.table_error("cannot create tracking table", e))?;
        if !created {
            error!(table = %self.table, "Tracking table exists with an incompatible schema");
            return Err(Error::migration_table(format!(
                "tracking table '{}' could not be created by store '{}'",
                self.table,
                self.store.provider_name()
            )));
        }
        Ok(())
    }

    async fn baseline(&self, application: &ApplicationName) -> Result<Option<u32>> {
        let partition = ItemValue::S(application.to_string());
        let latest = self
            .store
            .latest_item(&self.table, &partition)
            .await
            .map_err(|e| self.table_error("cannot read baseline", e))?;
        match latest {
            None => Ok(None),
            Some(item) => {
                let record = record_from_item(&item)?;
                if record.application != application.as_str() {
                    return Err(Error::migration_table(format!(
                        "record for migration {} belongs to '{}', expected '{application}'",
                        record.index, record.application
                    )));
                }
                Ok(Some(record.index))
            }
        }
    }

    /// Units strictly above the baseline, ascending by index
    pub fn select_pending(
        registry: &MigrationRegistry,
        baseline: Option<u32>,
    ) -> Vec<Arc<dyn Migration>> {
        registry
            .iter()
            .filter(|unit| baseline.is_none_or(|applied| unit.index() > applied))
            .cloned()
            .collect()
    }

    async fn apply(&self, application: &ApplicationName, unit: &dyn Migration) -> Result<()> {
        let index = unit.index();
        info!(
            application = %application,
            index,
            description = unit.description(),
            "Applying migration"
        );

        let context = MigrationContext {
            application,
            store: self.store.as_ref(),
            native: self.store.native_client(),
        };
        if let Err(e) = unit.migrate(&context).await {
            error!(application = %application, index, error = %e, "Migration failed");
            return Err(Error::MigrationApply {
                index,
                description: unit.description().to_string(),
                source: Box::new(e),
            });
        }

        let record = MigrationRecord {
            application: application.to_string(),
            index,
            description: unit.description().to_string(),
            applied_at: Some(Utc::now()),
        };
        self.store
            .put_item(&self.table, &record_key(application, index), record_fields(&record))
            .await
            .map_err(|e| self.table_error("cannot record migration", e))?;
        info!(application = %application, index, "Recorded migration");
        Ok(())
    }
}

fn record_key(application: &ApplicationName, index: u32) -> ItemKey {
    ItemKey {
        partition: ItemValue::S(application.to_string()),
        sort: Some(ItemValue::N(i64::from(index))),
    }
}

/// Every attribute of a record, key attributes included
///
/// Stores are not required to copy key attributes into the stored item, so
/// the runner writes them itself.
fn record_fields(record: &MigrationRecord) -> Item {
    let mut fields = Item::new();
    fields.insert(
        MIGRATION_FIELD_APPLICATION.to_string(),
        ItemValue::S(record.application.clone()),
    );
    fields.insert(
        MIGRATION_FIELD_INDEX.to_string(),
        ItemValue::N(i64::from(record.index)),
    );
    fields.insert(
        MIGRATION_FIELD_DESCRIPTION.to_string(),
        ItemValue::S(record.description.clone()),
    );
    if let Some(applied_at) = record.applied_at {
        fields.insert(
            MIGRATION_FIELD_APPLIED_AT.to_string(),
            ItemValue::S(applied_at.to_rfc3339()),
        );
    }
    fields
}

/// Parse a tracking-table item; anything malformed is a table error
pub fn record_from_item(item: &Item) -> Result<MigrationRecord> {
    let malformed =
        |what: &str| Error::migration_table(format!("malformed migration record: {what}"));

    let application = item
        .get(MIGRATION_FIELD_APPLICATION)
        .and_then(ItemValue::as_str)
        .ok_or_else(|| malformed("missing application"))?;
    let index = item
        .get(MIGRATION_FIELD_INDEX)
        .and_then(ItemValue::as_number)
        .ok_or_else(|| malformed("missing index"))?;
    let index = u32::try_from(index).map_err(|_| malformed("index out of range"))?;
    let description = item
        .get(MIGRATION_FIELD_DESCRIPTION)
        .and_then(ItemValue::as_str)
        .ok_or_else(|| malformed("missing description"))?;
    let applied_at = match item.get(MIGRATION_FIELD_APPLIED_AT) {
        None => None,
        Some(value) => {
            let raw = value.as_str().ok_or_else(|| malformed("applied_at is not a string"))?;
            let parsed = DateTime::parse_from_rfc3339(raw)
                .map_err(|_| malformed("applied_at is not an RFC 3339 timestamp"))?;
            Some(parsed.with_timezone(&Utc))
        }
    };

    Ok(MigrationRecord {
        application: application.to_string(),
        index,
        description: description.to_string(),
        applied_at,
    })
}
