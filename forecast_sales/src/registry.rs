//! Named, versioned model registry

use chrono::NaiveDateTime;

use sales_store::{ModelRecord, NewModelRecord, SalesStore, StoreError};

use crate::error::{ForecastError, Result};

/// Registry over the `ml_models` table.
///
/// Activation is per-row: flipping one version active deliberately leaves
/// sibling versions untouched, so several versions of a name may be active at
/// once. "The active model" for a name is therefore a resolution policy, not
/// a uniqueness constraint: the most recent `training_date` among active rows
/// wins, and exact ties go to the highest id.
pub struct ModelRegistry<'a> {
    store: &'a SalesStore,
}

impl<'a> ModelRegistry<'a> {
    pub fn new(store: &'a SalesStore) -> Self {
        Self { store }
    }

    /// Register a model version. Fails with `DuplicateVersion` when the
    /// (name, version) pair already exists.
    pub fn register(&self, record: &NewModelRecord) -> Result<i64> {
        let id = self.store.insert_model(record)?;
        log::info!(
            "registered model {} {} as id {}",
            record.name,
            record.version,
            id
        );
        Ok(id)
    }

    /// Mark one version active.
    pub fn activate(&self, id: i64) -> Result<()> {
        Ok(self.store.set_model_active(id, true)?)
    }

    /// Mark one version inactive.
    pub fn deactivate(&self, id: i64) -> Result<()> {
        Ok(self.store.set_model_active(id, false)?)
    }

    pub fn get(&self, id: i64) -> Result<ModelRecord> {
        Ok(self.store.model(id)?)
    }

    /// Resolve the active model for a name.
    pub fn get_active(&self, name: &str) -> Result<ModelRecord> {
        self.store.active_model(name)?.ok_or_else(|| {
            ForecastError::Store(StoreError::NotFound(format!(
                "no active model named {name}"
            )))
        })
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<ModelRecord>> {
        Ok(self.store.models(active_only)?)
    }

    /// Record the outcome of a finished training run.
    pub fn record_training(&self, id: i64, score: f64, trained_at: NaiveDateTime) -> Result<()> {
        self.store.update_model_performance(id, score, trained_at)?;
        log::info!("model {id} trained at {trained_at} with score {score:.3}");
        Ok(())
    }
}
