//! Matching past forecasts to realized outcomes

use chrono::NaiveDate;

use sales_store::SalesStore;

use crate::error::Result;

/// Fills in actuals and signed errors for matured predictions.
pub struct ReconciliationEngine<'a> {
    store: &'a SalesStore,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(store: &'a SalesStore) -> Self {
        Self { store }
    }

    /// Resolve every prediction with a target date on or before `as_of` for
    /// which observations have arrived. The actual is the summed
    /// sales_amount across all observation rows for the target date, the
    /// same aggregation the forecast target represents; the stored error is
    /// the signed `predicted_value - actual_value`.
    ///
    /// A target date with no observations yet simply stays unresolved.
    /// Re-running only touches rows still unresolved, so the pass is
    /// idempotent, and a resolved row is never rewritten even if its
    /// observations are corrected later.
    pub fn reconcile(&self, as_of: NaiveDate) -> Result<usize> {
        let candidates = self.store.unresolved_predictions(as_of)?;
        let mut resolved = 0;
        for prediction in &candidates {
            let actual = match self.store.daily_total(prediction.target_date)? {
                Some(total) => total,
                None => continue,
            };
            let error = prediction.predicted_value - actual;
            if self
                .store
                .resolve_prediction(prediction.id, actual, error)?
            {
                resolved += 1;
            }
        }
        log::info!(
            "reconciliation through {as_of}: resolved {resolved} of {} candidates",
            candidates.len()
        );
        Ok(resolved)
    }
}
