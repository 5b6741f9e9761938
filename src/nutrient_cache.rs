//! # Nutrient Cache Module
//!
//! In-memory snapshot of the nutrient store shared by every calculation of a process.
//!
//! # Lifecycle
//!
//! - Empty until the first calculation calls [`NutrientCache::load_if_absent`]
//! - Grows when the matcher resolves an ingredient through the bulk dataset
//! - [`NutrientCache::invalidate`] drops the snapshot so the next calculation reloads it
//!   (needed after bulk seeding)
//!
//! # Thread Safety
//!
//! Readers take a cheap `Arc` snapshot. Inserts happen under the write lock with a
//! name check, so two ingredients resolving the same food never both add it.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::db::NutrientStore;
use crate::nutrition_errors::NutritionError;
use crate::nutrition_model::NutrientRecord;

#[derive(Debug, Default)]
pub struct NutrientCache {
    records: RwLock<Option<Arc<Vec<NutrientRecord>>>>,
}

impl NutrientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with records, without touching a store.
    pub fn with_records(records: Vec<NutrientRecord>) -> Self {
        Self {
            records: RwLock::new(Some(Arc::new(records))),
        }
    }

    /// Load the snapshot from the store unless it is already loaded.
    pub async fn load_if_absent(&self, store: &dyn NutrientStore) -> Result<(), NutritionError> {
        if self.records.read().await.is_some() {
            return Ok(());
        }

        let mut guard = self.records.write().await;
        // another task may have loaded it while we waited for the lock
        if guard.is_none() {
            let records = store.all_nutrient_records().await?;
            info!(records = records.len(), "Nutrient cache loaded");
            *guard = Some(Arc::new(records));
        }
        Ok(())
    }

    /// Current records; empty when nothing is loaded.
    pub async fn snapshot(&self) -> Arc<Vec<NutrientRecord>> {
        self.records.read().await.clone().unwrap_or_default()
    }

    /// Append a record unless one with the same name (ignoring case) is already cached.
    ///
    /// Returns whether the record was added. An unloaded cache stays unloaded; the next
    /// load reads the record back from the store.
    pub async fn insert_if_absent(&self, record: NutrientRecord) -> bool {
        let mut guard = self.records.write().await;
        let Some(snapshot) = guard.as_mut() else {
            debug!(name = %record.ingredient_name, "Cache not loaded, leaving record to the store");
            return false;
        };
        let records = Arc::make_mut(snapshot);
        let duplicate = records
            .iter()
            .any(|existing| existing.ingredient_name.eq_ignore_ascii_case(&record.ingredient_name));
        if duplicate {
            debug!(name = %record.ingredient_name, "Record already cached");
            return false;
        }
        debug!(name = %record.ingredient_name, "Record added to cache");
        records.push(record);
        true
    }

    /// Drop the snapshot; the next `load_if_absent` reloads from the store.
    pub async fn invalidate(&self) {
        *self.records.write().await = None;
        info!("Nutrient cache invalidated");
    }

    pub async fn is_loaded(&self) -> bool {
        self.records.read().await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.as_ref().map_or(0, |records| records.len())
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
