//! Minimal forecasting example: bootstrap synthetic history, request a
//! one-week forecast and print it.

use chrono::{Duration, NaiveDate};

use forecast_sales::models::seasonal_trend::SeasonalTrend;
use forecast_sales::synthetic;
use forecast_sales::{EngineConfig, SalesForecastEngine};

fn main() -> forecast_sales::Result<()> {
    let engine = SalesForecastEngine::open_in_memory(EngineConfig::default())?;

    // Six months of synthetic history plus an active "SalesPredictor" model.
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    synthetic::seed_store(engine.store(), start, 180, 42)?;
    let as_of = start + Duration::days(179);

    let strategy = SeasonalTrend::new(42);
    let predictions = engine.request_forecast("SalesPredictor", &strategy, 7, as_of)?;

    println!("Forecast from {as_of} using {}:", engine.registry().get_active("SalesPredictor")?.name);
    for prediction in &predictions {
        println!(
            "  {}  predicted {:8.2}  confidence {:.3}",
            prediction.target_date, prediction.predicted_value, prediction.confidence_score
        );
    }
    Ok(())
}
