// 🗄️ Record Store - In-memory repository, snapshot files and CSV import
//
// Readers get cloned snapshots; nothing handed out aliases store state.
// Every mutation is validated here and leaves an audit event behind.

use crate::entities::{Crop, Farm, Record, RecordId, Task, Transaction, TransactionType, WeatherDay};
use crate::error::{StoreError, StoreResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

const STORE_ACTOR: &str = "store";
const IMPORT_ACTOR: &str = "csv_importer";
const LOADER_ACTOR: &str = "snapshot_loader";

// ============================================================================
// RECORD STORE CONTRACT
// ============================================================================

/// Source of record snapshots for the aggregation engine.
///
/// Listing a farm-scoped table for an unknown farm is `NotFound`.
pub trait RecordStore {
    fn list_farms(&self) -> Vec<Farm>;
    fn get_farm(&self, id: RecordId) -> StoreResult<Farm>;
    fn list_crops_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Crop>>;
    fn list_tasks_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Task>>;
    fn list_transactions_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Transaction>>;

    /// Ascending by date; entries with unusable dates last.
    fn list_weather_forecast(&self) -> Vec<WeatherDay>;

    fn create_farm(&self, farm: Farm) -> StoreResult<Farm>;
    fn update_farm(&self, farm: Farm) -> StoreResult<Farm>;
    /// Also removes the farm's crops, tasks and transactions.
    fn delete_farm(&self, id: RecordId) -> bool;

    fn create_crop(&self, crop: Crop) -> StoreResult<Crop>;
    /// Moving a crop to another farm fails while tasks are linked to it.
    fn update_crop(&self, crop: Crop) -> StoreResult<Crop>;
    /// Tasks linked to the crop keep existing without the link.
    fn delete_crop(&self, id: RecordId) -> bool;

    fn create_task(&self, task: Task) -> StoreResult<Task>;
    fn update_task(&self, task: Task) -> StoreResult<Task>;
    fn delete_task(&self, id: RecordId) -> bool;

    fn create_transaction(&self, transaction: Transaction) -> StoreResult<Transaction>;
    fn update_transaction(&self, transaction: Transaction) -> StoreResult<Transaction>;
    fn delete_transaction(&self, id: RecordId) -> bool;

    /// Audit trail for one record, newest first.
    fn events_for_entity(&self, entity_type: &str, entity_id: RecordId) -> Vec<Event>;
}

// ============================================================================
// AUDIT EVENTS
// ============================================================================

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: RecordId,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: RecordId,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// SNAPSHOT FILE
// ============================================================================

/// On-disk form of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub farms: Vec<Farm>,
    pub crops: Vec<Crop>,
    pub tasks: Vec<Task>,
    pub transactions: Vec<Transaction>,
    pub weather: Vec<WeatherDay>,
}

impl Snapshot {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse snapshot JSON")
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write snapshot file: {:?}", path.as_ref()))
    }
}

// ============================================================================
// TABLES
// ============================================================================

#[derive(Default)]
struct Tables {
    farms: Vec<Farm>,
    crops: Vec<Crop>,
    tasks: Vec<Task>,
    transactions: Vec<Transaction>,
    weather: Vec<WeatherDay>,
    events: Vec<Event>,
}

/// Maps a record type to its table.
trait Table: Record + Serialize {
    fn rows(tables: &Tables) -> &Vec<Self>;
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;
}

macro_rules! impl_table {
    ($record:ty, $field:ident) => {
        impl Table for $record {
            fn rows(tables: &Tables) -> &Vec<Self> {
                &tables.$field
            }

            fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
                &mut tables.$field
            }
        }
    };
}

impl_table!(Farm, farms);
impl_table!(Crop, crops);
impl_table!(Task, tasks);
impl_table!(Transaction, transactions);

impl Tables {
    fn farm_exists(&self, id: RecordId) -> bool {
        self.farms.iter().any(|farm| farm.id == id)
    }

    fn require_farm(&self, id: RecordId) -> StoreResult<()> {
        if self.farm_exists(id) {
            Ok(())
        } else {
            Err(StoreError::not_found(Farm::ENTITY, id))
        }
    }

    /// Owning farm must exist; a linked crop must exist on that same farm.
    fn check_references<T: Record>(&self, record: &T) -> StoreResult<()> {
        if let Some(farm_id) = record.farm_id() {
            self.require_farm(farm_id)?;
        }

        if let Some(crop_id) = record.crop_id() {
            let crop = self
                .crops
                .iter()
                .find(|crop| crop.id == crop_id)
                .ok_or_else(|| StoreError::not_found(Crop::ENTITY, crop_id))?;

            if Some(crop.farm_id) != record.farm_id() {
                return Err(StoreError::invalid(format!(
                    "{} {} references crop {} of farm {}",
                    T::ENTITY,
                    record.id(),
                    crop_id,
                    crop.farm_id
                )));
            }
        }

        Ok(())
    }

    fn record_event<T: Table>(&mut self, action: &str, record: &T, actor: &str) {
        let data = serde_json::to_value(record).unwrap_or_default();
        self.events.push(Event::new(
            &format!("{}_{}", T::ENTITY, action),
            T::ENTITY,
            record.id(),
            data,
            actor,
        ));
    }

    /// Keeps a positive supplied id, assigns the next free one otherwise.
    fn insert<T: Table>(&mut self, mut record: T, actor: &str) -> StoreResult<T> {
        record.validate()?;
        self.check_references(&record)?;

        let rows = T::rows_mut(self);
        if record.id() <= 0 {
            let next = rows.iter().map(|row| row.id()).max().unwrap_or(0) + 1;
            record.set_id(next);
        } else if rows.iter().any(|row| row.id() == record.id()) {
            return Err(StoreError::duplicate(format!("{} {} already exists", T::ENTITY, record.id())));
        }
        rows.push(record.clone());

        self.record_event("created", &record, actor);
        Ok(record)
    }

    fn replace<T: Table>(&mut self, record: T) -> StoreResult<T> {
        if !T::rows(self).iter().any(|row| row.id() == record.id()) {
            return Err(StoreError::not_found(T::ENTITY, record.id()));
        }
        record.validate()?;
        self.check_references(&record)?;

        if let Some(slot) = T::rows_mut(self).iter_mut().find(|row| row.id() == record.id()) {
            *slot = record.clone();
        }

        self.record_event("updated", &record, STORE_ACTOR);
        Ok(record)
    }

    fn remove<T: Table>(&mut self, id: RecordId) -> Option<T> {
        let rows = T::rows_mut(self);
        let position = rows.iter().position(|row| row.id() == id)?;
        let removed = rows.remove(position);

        self.record_event("deleted", &removed, STORE_ACTOR);
        Some(removed)
    }

    /// Drops every row owned by `farm_id`, logging a delete event per row.
    fn remove_for_farm<T: Table>(&mut self, farm_id: RecordId) -> usize {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(T::rows_mut(self))
            .into_iter()
            .partition(|row| row.farm_id() == Some(farm_id));
        *T::rows_mut(self) = kept;

        for row in &removed {
            self.record_event("deleted", row, STORE_ACTOR);
        }
        removed.len()
    }

    /// A crop cannot change farms while tasks are still linked to it.
    fn check_crop_move(&self, crop: &Crop) -> StoreResult<()> {
        let moved = self
            .crops
            .iter()
            .any(|existing| existing.id == crop.id && existing.farm_id != crop.farm_id);
        let linked = self.tasks.iter().filter(|task| task.crop_id == Some(crop.id)).count();

        if moved && linked > 0 {
            return Err(StoreError::invalid(format!(
                "crop {} has {} linked task(s) on farm {}",
                crop.id,
                linked,
                self.crops
                    .iter()
                    .find(|existing| existing.id == crop.id)
                    .map_or(crop.farm_id, |existing| existing.farm_id)
            )));
        }
        Ok(())
    }

    fn for_farm<T: Table>(&self, farm_id: RecordId) -> StoreResult<Vec<T>> {
        self.require_farm(farm_id)?;
        Ok(T::rows(self)
            .iter()
            .filter(|row| row.farm_id() == Some(farm_id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, validating every record and reference.
    /// Parents must precede children: farms, crops, tasks, transactions.
    pub fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let mut tables = Tables::default();

        for farm in snapshot.farms {
            tables.insert(farm, LOADER_ACTOR)?;
        }
        for crop in snapshot.crops {
            tables.insert(crop, LOADER_ACTOR)?;
        }
        for task in snapshot.tasks {
            tables.insert(task, LOADER_ACTOR)?;
        }
        for transaction in snapshot.transactions {
            tables.insert(transaction, LOADER_ACTOR)?;
        }
        tables.weather = snapshot.weather;

        Ok(InMemoryStore {
            tables: RwLock::new(tables),
        })
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshot = Snapshot::from_file(path.as_ref())?;
        let store = Self::from_snapshot(snapshot)
            .with_context(|| format!("Invalid record in snapshot {:?}", path.as_ref()))?;

        let tables = store.read();
        info!(
            farms = tables.farms.len(),
            crops = tables.crops.len(),
            tasks = tables.tasks.len(),
            transactions = tables.transactions.len(),
            weather_days = tables.weather.len(),
            "loaded snapshot from {}",
            path.as_ref().display()
        );
        drop(tables);

        Ok(store)
    }

    pub fn snapshot(&self) -> Snapshot {
        let tables = self.read();
        Snapshot {
            farms: tables.farms.clone(),
            crops: tables.crops.clone(),
            tasks: tables.tasks.clone(),
            transactions: tables.transactions.clone(),
            weather: tables.weather.clone(),
        }
    }

    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.snapshot().write_to(path.as_ref())?;
        info!("saved snapshot to {}", path.as_ref().display());
        Ok(())
    }

    pub fn set_weather_forecast(&self, forecast: Vec<WeatherDay>) {
        info!(days = forecast.len(), "weather forecast replaced");
        self.write().weather = forecast;
    }

    /// Insert transactions, skipping any whose content hash is already
    /// stored (or repeats earlier in the batch). All rows are checked before
    /// any is inserted.
    pub fn import_transactions(&self, transactions: Vec<Transaction>) -> StoreResult<ImportReport> {
        let mut tables = self.write();

        for tx in &transactions {
            if let Err(e) = tx.validate().and_then(|_| tables.check_references(tx)) {
                warn!("rejected import row ({} {} on {}): {}", tx.transaction_type.as_str(), tx.amount, tx.date, e);
                return Err(e);
            }
        }

        let mut seen: HashSet<String> = tables
            .transactions
            .iter()
            .map(|tx| tx.compute_idempotency_hash())
            .collect();
        let mut report = ImportReport::default();

        for mut tx in transactions {
            if !seen.insert(tx.compute_idempotency_hash()) {
                warn!("skipped duplicate transaction: {} {} on {}", tx.category, tx.amount, tx.date);
                report.duplicates += 1;
                continue;
            }

            tx.set_id(0);
            tables.insert(tx, IMPORT_ACTOR)?;
            report.inserted += 1;
        }

        info!(inserted = report.inserted, duplicates = report.duplicates, "transaction import finished");
        Ok(report)
    }

    pub fn event_count(&self) -> usize {
        self.read().events.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn create<T: Table>(&self, mut record: T) -> StoreResult<T> {
        record.set_id(0);
        let result = self.write().insert(record, STORE_ACTOR);
        match &result {
            Ok(created) => info!(entity = T::ENTITY, id = created.id(), "record created"),
            Err(e) => warn!(entity = T::ENTITY, "create rejected: {}", e),
        }
        result
    }

    fn update<T: Table>(&self, record: T) -> StoreResult<T> {
        self.update_checked(record, |_, _| Ok(()))
    }

    /// `check` runs under the same write lock as the replace.
    fn update_checked<T, F>(&self, record: T, check: F) -> StoreResult<T>
    where
        T: Table,
        F: FnOnce(&Tables, &T) -> StoreResult<()>,
    {
        let result = {
            let mut tables = self.write();
            check(&*tables, &record).and_then(|_| tables.replace(record))
        };
        match &result {
            Ok(updated) => info!(entity = T::ENTITY, id = updated.id(), "record updated"),
            Err(e) => warn!(entity = T::ENTITY, "update rejected: {}", e),
        }
        result
    }
}

impl RecordStore for InMemoryStore {
    fn list_farms(&self) -> Vec<Farm> {
        self.read().farms.clone()
    }

    fn get_farm(&self, id: RecordId) -> StoreResult<Farm> {
        self.read()
            .farms
            .iter()
            .find(|farm| farm.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Farm::ENTITY, id))
    }

    fn list_crops_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Crop>> {
        self.read().for_farm(farm_id)
    }

    fn list_tasks_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Task>> {
        self.read().for_farm(farm_id)
    }

    fn list_transactions_for_farm(&self, farm_id: RecordId) -> StoreResult<Vec<Transaction>> {
        self.read().for_farm(farm_id)
    }

    fn list_weather_forecast(&self) -> Vec<WeatherDay> {
        let mut forecast = self.read().weather.clone();
        forecast.sort_by(|a, b| match (a.forecast_on(), b.forecast_on()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        forecast
    }

    fn create_farm(&self, farm: Farm) -> StoreResult<Farm> {
        self.create(farm)
    }

    fn update_farm(&self, farm: Farm) -> StoreResult<Farm> {
        self.update(farm)
    }

    fn delete_farm(&self, id: RecordId) -> bool {
        let mut tables = self.write();
        if tables.remove::<Farm>(id).is_none() {
            return false;
        }

        let crops = tables.remove_for_farm::<Crop>(id);
        let tasks = tables.remove_for_farm::<Task>(id);
        let transactions = tables.remove_for_farm::<Transaction>(id);

        info!(id, crops, tasks, transactions, "farm deleted with its records");
        true
    }

    fn create_crop(&self, crop: Crop) -> StoreResult<Crop> {
        self.create(crop)
    }

    fn update_crop(&self, crop: Crop) -> StoreResult<Crop> {
        self.update_checked(crop, |tables, crop| tables.check_crop_move(crop))
    }

    fn delete_crop(&self, id: RecordId) -> bool {
        let mut tables = self.write();
        if tables.remove::<Crop>(id).is_none() {
            return false;
        }

        let mut unlinked = Vec::new();
        for task in tables.tasks.iter_mut().filter(|task| task.crop_id == Some(id)) {
            task.crop_id = None;
            unlinked.push(task.clone());
        }
        for task in &unlinked {
            tables.record_event("updated", task, STORE_ACTOR);
        }

        info!(id, unlinked = unlinked.len(), "crop deleted");
        true
    }

    fn create_task(&self, task: Task) -> StoreResult<Task> {
        self.create(task)
    }

    fn update_task(&self, task: Task) -> StoreResult<Task> {
        self.update(task)
    }

    fn delete_task(&self, id: RecordId) -> bool {
        let removed = self.write().remove::<Task>(id).is_some();
        if removed {
            info!(id, "task deleted");
        }
        removed
    }

    fn create_transaction(&self, transaction: Transaction) -> StoreResult<Transaction> {
        self.create(transaction)
    }

    fn update_transaction(&self, transaction: Transaction) -> StoreResult<Transaction> {
        self.update(transaction)
    }

    fn delete_transaction(&self, id: RecordId) -> bool {
        let removed = self.write().remove::<Transaction>(id).is_some();
        if removed {
            info!(id, "transaction deleted");
        }
        removed
    }

    fn events_for_entity(&self, entity_type: &str, entity_id: RecordId) -> Vec<Event> {
        self.read()
            .events
            .iter()
            .rev()
            .filter(|event| event.entity_type == entity_type && event.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

// ============================================================================
// CSV IMPORT
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub duplicates: usize,
}

#[derive(Debug, Deserialize)]
struct CsvTransactionRow {
    #[serde(rename = "type")]
    transaction_type: String,
    category: String,
    amount: f64,
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "farmId", alias = "farm_id")]
    farm_id: Option<String>,
}

/// Read a transactions CSV. Rows without a `farmId` column value belong to
/// `default_farm_id`.
pub fn load_transactions_csv(csv_path: &Path, default_farm_id: RecordId) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .context("Failed to open CSV file")?;

    let mut transactions = Vec::new();

    for (index, result) in rdr.deserialize::<CsvTransactionRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = result.with_context(|| format!("Failed to deserialize transaction on line {}", line))?;

        let transaction_type: TransactionType = row
            .transaction_type
            .parse()
            .with_context(|| format!("Bad transaction type on line {}", line))?;

        let farm_id = match row.farm_id.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw
                .parse::<RecordId>()
                .with_context(|| format!("Invalid farmId {:?} on line {}", raw, line))?,
            None => default_farm_id,
        };

        transactions.push(Transaction::new(
            farm_id,
            transaction_type,
            &row.category,
            row.amount,
            &row.date,
            &row.description,
        ));
    }

    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CropStatus, FarmType, TaskType, WeatherCondition};

    fn create_test_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .create_farm(Farm::new("Green Acres", "Fresno, CA", 120.0, FarmType::Crop))
            .unwrap();
        store
            .create_farm(Farm::new("Hillside", "Napa, CA", 40.0, FarmType::Vineyard))
            .unwrap();
        store
    }

    fn create_test_transaction(farm_id: RecordId, amount: f64, date: &str) -> Transaction {
        Transaction::new(farm_id, TransactionType::Expense, "seeds", amount, date, "Seed order")
    }

    #[test]
    fn test_create_assigns_next_id() {
        let store = create_test_store();
        let farms = store.list_farms();

        assert_eq!(farms.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2]);

        let mut farm = Farm::new("Third", "Yuma, AZ", 10.0, FarmType::Mixed);
        farm.id = 77;
        assert_eq!(store.create_farm(farm).unwrap().id, 3);
    }

    #[test]
    fn test_invalid_records_rejected() {
        let store = create_test_store();

        let err = store
            .create_farm(Farm::new("Nowhere", "?", 0.0, FarmType::Crop))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));

        let err = store.create_transaction(create_test_transaction(1, -1.0, "2024-03-01")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_farm_is_not_found() {
        let store = create_test_store();

        let err = store
            .create_crop(Crop::new(99, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("farm", 99));

        assert!(store.list_tasks_for_farm(99).unwrap_err().is_not_found());
        assert!(store.get_farm(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_task_crop_must_belong_to_same_farm() {
        let store = create_test_store();
        let crop = store
            .create_crop(Crop::new(1, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap();

        let mut task = Task::new(2, "Water corn", TaskType::Watering, "2024-03-20");
        task.crop_id = Some(crop.id);
        assert!(matches!(store.create_task(task.clone()).unwrap_err(), StoreError::InvalidInput(_)));

        task.farm_id = 1;
        assert!(store.create_task(task).is_ok());
    }

    #[test]
    fn test_update_and_delete() {
        let store = create_test_store();
        let mut task = store
            .create_task(Task::new(1, "Prune", TaskType::Pruning, "2024-03-20"))
            .unwrap();

        task.completed = true;
        assert!(store.update_task(task.clone()).unwrap().completed);
        assert!(store.list_tasks_for_farm(1).unwrap()[0].completed);

        let mut ghost = task.clone();
        ghost.id = 404;
        assert!(store.update_task(ghost).unwrap_err().is_not_found());

        assert!(store.delete_task(task.id));
        assert!(!store.delete_task(task.id));
        assert!(store.list_tasks_for_farm(1).unwrap().is_empty());
    }

    #[test]
    fn test_delete_farm_cascades() {
        let store = create_test_store();
        store
            .create_crop(Crop::new(1, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap();
        store
            .create_task(Task::new(1, "Weed", TaskType::Weeding, "2024-03-20"))
            .unwrap();
        store.create_transaction(create_test_transaction(1, 10.0, "2024-03-01")).unwrap();
        store.create_transaction(create_test_transaction(2, 10.0, "2024-03-01")).unwrap();

        assert!(store.delete_farm(1));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.farms.len(), 1);
        assert!(snapshot.crops.is_empty());
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].farm_id, 2);
    }

    #[test]
    fn test_delete_crop_unlinks_tasks() {
        let store = create_test_store();
        let crop = store
            .create_crop(Crop::new(1, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap();
        let mut task = Task::new(1, "Harvest corn", TaskType::Harvesting, "2024-09-01");
        task.crop_id = Some(crop.id);
        store.create_task(task).unwrap();

        assert!(store.delete_crop(crop.id));
        assert_eq!(store.list_tasks_for_farm(1).unwrap()[0].crop_id, None);
    }

    #[test]
    fn test_crop_with_linked_tasks_cannot_change_farm() {
        let store = create_test_store();
        let mut crop = store
            .create_crop(Crop::new(1, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap();
        let mut task = Task::new(1, "Water corn", TaskType::Watering, "2024-03-20");
        task.crop_id = Some(crop.id);
        let task = store.create_task(task).unwrap();

        crop.farm_id = 2;
        let err = store.update_crop(crop.clone()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert_eq!(store.list_crops_for_farm(1).unwrap().len(), 1);
        assert!(store.update_task(task.clone()).is_ok());

        // Once unlinked the crop may move.
        assert!(store.delete_task(task.id));
        assert_eq!(store.update_crop(crop).unwrap().farm_id, 2);
        assert!(store.list_crops_for_farm(1).unwrap().is_empty());
    }

    #[test]
    fn test_cascades_are_audited() {
        let store = create_test_store();
        let crop = store
            .create_crop(Crop::new(1, "corn", "Dent", "2024-03-01", CropStatus::Planted))
            .unwrap();
        let mut task = Task::new(1, "Harvest corn", TaskType::Harvesting, "2024-09-01");
        task.crop_id = Some(crop.id);
        let task = store.create_task(task).unwrap();
        let tx = store.create_transaction(create_test_transaction(1, 10.0, "2024-03-01")).unwrap();

        assert!(store.delete_crop(crop.id));
        let task_events = store.events_for_entity("task", task.id);
        assert_eq!(task_events[0].event_type, "task_updated");
        assert!(task_events[0].data["cropId"].is_null());

        assert!(store.delete_farm(1));
        assert_eq!(store.events_for_entity("task", task.id)[0].event_type, "task_deleted");
        assert_eq!(store.events_for_entity("transaction", tx.id)[0].event_type, "transaction_deleted");
        assert_eq!(store.events_for_entity("farm", 1)[0].event_type, "farm_deleted");

        println!("✅ Cascade audit test PASSED");
    }

    #[test]
    fn test_import_keeps_amounts_that_round_to_the_same_cent() {
        let store = create_test_store();
        let report = store
            .import_transactions(vec![
                create_test_transaction(1, 10.001, "2024-03-01"),
                create_test_transaction(1, 10.004, "2024-03-01"),
            ])
            .unwrap();

        assert_eq!(report, ImportReport { inserted: 2, duplicates: 0 });
    }

    #[test]
    fn test_event_log() {
        let store = create_test_store();
        let mut farm = store.get_farm(1).unwrap();
        farm.size = 150.0;
        store.update_farm(farm).unwrap();

        let events = store.events_for_entity("farm", 1);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "farm_updated");
        assert_eq!(events[1].event_type, "farm_created");
        assert_eq!(events[0].data["size"], 150.0);
        assert_ne!(events[0].event_id, events[1].event_id);

        println!("✅ Event log test PASSED");
    }

    #[test]
    fn test_weather_listed_by_date() {
        let store = InMemoryStore::new();
        store.set_weather_forecast(vec![
            WeatherDay::new("2024-03-17", 70.0, WeatherCondition::Sunny),
            WeatherDay::new("tbd", 70.0, WeatherCondition::Sunny),
            WeatherDay::new("2024-03-15", 70.0, WeatherCondition::Rainy),
        ]);

        let dates: Vec<String> = store.list_weather_forecast().into_iter().map(|d| d.date).collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-17", "tbd"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm-data.json");

        let store = create_test_store();
        store
            .create_crop(Crop::new(2, "grapes", "Merlot", "2023-04-01", CropStatus::Growing))
            .unwrap();
        store.set_weather_forecast(vec![WeatherDay::new("2024-03-15", 70.0, WeatherCondition::Sunny)]);
        store.save_snapshot(&path).unwrap();

        let loaded = InMemoryStore::load_snapshot(&path).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[test]
    fn test_snapshot_accepts_string_ids_and_rejects_bad_references() {
        let good = r#"{
            "farms": [{"id": "1", "name": "A", "location": "B", "size": 5, "type": "mixed"}],
            "crops": [{"id": 3, "farmId": "1", "type": "corn", "plantingDate": "2024-01-01", "status": "planted"}]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(good).unwrap();
        let store = InMemoryStore::from_snapshot(snapshot).unwrap();
        assert_eq!(store.list_crops_for_farm(1).unwrap()[0].id, 3);

        let orphan = r#"{"crops": [{"id": 3, "farmId": 8, "type": "corn", "plantingDate": "2024-01-01", "status": "planted"}]}"#;
        let snapshot: Snapshot = serde_json::from_str(orphan).unwrap();
        assert!(InMemoryStore::from_snapshot(snapshot).is_err());

        let twice = r#"{"farms": [{"id": 1, "name": "A", "location": "B", "size": 5, "type": "crop"},
                                  {"id": 1, "name": "C", "location": "D", "size": 5, "type": "crop"}]}"#;
        let snapshot: Snapshot = serde_json::from_str(twice).unwrap();
        assert!(matches!(InMemoryStore::from_snapshot(snapshot), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_idempotency_import_twice() {
        let store = create_test_store();
        let transactions = vec![
            create_test_transaction(1, 45.99, "2024-03-01"),
            create_test_transaction(1, 120.50, "2024-03-02"),
            Transaction::new(1, TransactionType::Income, "harvest", 2000.0, "2024-03-03", "Corn sale"),
        ];

        let first = store.import_transactions(transactions.clone()).unwrap();
        let second = store.import_transactions(transactions).unwrap();

        assert_eq!(first, ImportReport { inserted: 3, duplicates: 0 });
        assert_eq!(second, ImportReport { inserted: 0, duplicates: 3 });
        assert_eq!(store.list_transactions_for_farm(1).unwrap().len(), 3);

        println!("✅ Idempotency test PASSED: 0 duplicates inserted on second import");
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let store = create_test_store();
        let transactions = vec![
            create_test_transaction(1, 10.0, "2024-03-01"),
            create_test_transaction(42, 10.0, "2024-03-01"),
        ];

        assert!(store.import_transactions(transactions).unwrap_err().is_not_found());
        assert!(store.list_transactions_for_farm(1).unwrap().is_empty());
    }

    #[test]
    fn test_load_transactions_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(
            &path,
            "type,category,amount,date,description,farmId\n\
             expense,fuel,80.25,2024-03-02,Diesel,\n\
             income, harvest ,1500,2024-03-09,Corn sale,2\n",
        )
        .unwrap();

        let transactions = load_transactions_csv(&path, 1).unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].farm_id, 1);
        assert_eq!(transactions[0].amount, 80.25);
        assert!(transactions[1].is_income());
        assert_eq!(transactions[1].category, "harvest");
        assert_eq!(transactions[1].farm_id, 2);

        let store = create_test_store();
        let report = store.import_transactions(transactions).unwrap();
        assert_eq!(report.inserted, 2);
    }

    #[test]
    fn test_load_transactions_csv_without_farm_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(&path, "type,category,amount,date,description\nexpense,labor,300,2024-03-10,Crew\n").unwrap();

        let transactions = load_transactions_csv(&path, 2).unwrap();
        assert_eq!(transactions[0].farm_id, 2);

        fs::write(&path, "type,category,amount,date,description\ntransfer,labor,300,2024-03-10,Crew\n").unwrap();
        assert!(load_transactions_csv(&path, 2).is_err());
    }
}
