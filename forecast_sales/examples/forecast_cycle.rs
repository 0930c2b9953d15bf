//! Full engine cycle: ingest history, forecast, let actuals arrive,
//! reconcile and roll up the dashboard metrics.

use chrono::{Duration, NaiveDate};

use forecast_sales::models::seasonal_trend::SeasonalTrend;
use forecast_sales::synthetic;
use forecast_sales::{EngineConfig, SalesForecastEngine};

fn main() -> forecast_sales::Result<()> {
    let config = EngineConfig {
        daily_sales_target: Some(1500.0),
        ..EngineConfig::default()
    };
    let engine = SalesForecastEngine::open_in_memory(config)?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    synthetic::seed_store(engine.store(), start, 90, 7)?;
    let as_of = start + Duration::days(89);

    // 1. Forecast the coming week.
    let predictions =
        engine.request_forecast("SalesPredictor", &SeasonalTrend::new(7), 7, as_of)?;
    println!("Stored {} predictions from {as_of}", predictions.len());

    // 2. A week passes; realized sales arrive.
    for offset in 1..=7i64 {
        let day = as_of + Duration::days(offset);
        for observation in synthetic::sample_history(day, 1, 7 + offset as u64) {
            engine.ingest_observation(&observation)?;
        }
    }

    // 3. Reconcile matured forecasts against the actuals.
    let horizon_end = as_of + Duration::days(7);
    let resolved = engine.reconcile(horizon_end)?;
    println!("Reconciled {resolved} predictions");
    for prediction in engine.store().recent_predictions(7)? {
        println!(
            "  {}  predicted {:8.2}  actual {:8.2}  error {:+.2}",
            prediction.target_date,
            prediction.predicted_value,
            prediction.actual_value.unwrap_or(f64::NAN),
            prediction.accuracy_error.unwrap_or(f64::NAN),
        );
    }

    // 4. Roll up the day's business metrics.
    println!("Metrics for {horizon_end}:");
    for metric in engine.recompute_metrics(horizon_end)? {
        println!(
            "  {:24} {:12.4}  [{}]",
            metric.metric_name,
            metric.metric_value,
            metric.category
        );
    }

    // 5. Standing data quality checks for the ops dashboard.
    println!("Data quality:");
    for check in engine.data_quality_report(horizon_end)? {
        println!("  {:24} {:?}  {}", check.check_name, check.status, check.message);
    }
    Ok(())
}
