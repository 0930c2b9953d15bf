//! Seeded synthetic sales history for bootstrapping and tests

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map};
use std::f64::consts::PI;

use sales_store::{is_weekend, NewModelRecord, NewObservation, SalesStore};

use crate::error::Result;

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Books", "Home", "Sports"];
const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];

/// Generate `days` of synthetic transactions starting at `start`: a base
/// level plus linear trend, annual and weekly sine seasonality and bounded
/// uniform noise, split into several transactions per day. Bit-stable for a
/// fixed seed.
pub fn sample_history(start: NaiveDate, days: usize, seed: u64) -> Vec<NewObservation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut observations = Vec::new();
    let base_sales = 150.0;

    for i in 0..days {
        let date = start + Duration::days(i as i64);
        let day = i as f64;
        let trend = day * 0.05;
        let annual = 30.0 * (2.0 * PI * day / 365.25).sin();
        let weekly = 15.0 * (2.0 * PI * day / 7.0).sin();
        let noise = rng.gen_range(-25.0..=25.0);
        let daily_sales = (base_sales + trend + annual + weekly + noise).max(50.0);

        let transactions: u32 = rng.gen_range(5..=15);
        for _ in 0..transactions {
            let amount = daily_sales / f64::from(transactions) * rng.gen_range(0.5..=2.0);
            let quantity: i64 = rng.gen_range(1..=8);

            let base_temp = 15.0 + 10.0 * (2.0 * PI * day / 365.25).sin();
            let temperature = base_temp + rng.gen_range(-5.0..=5.0);

            let weekend_boost = if is_weekend(date) { 100.0 } else { 0.0 };
            let marketing = (200.0_f64 + weekend_boost + rng.gen_range(-50.0..=100.0)).max(0.0);

            observations.push(NewObservation {
                date,
                sales_amount: round_cents(amount),
                quantity,
                product_category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
                region: REGIONS[rng.gen_range(0..REGIONS.len())].to_string(),
                temperature: Some(round_cents(temperature)),
                marketing_spend: round_cents(marketing),
            });
        }
    }
    observations
}

/// Populate a store with synthetic history plus an active "SalesPredictor"
/// registration, the shape the original system bootstrapped with. Returns
/// the registered model id.
pub fn seed_store(store: &SalesStore, start: NaiveDate, days: usize, seed: u64) -> Result<i64> {
    let observations = sample_history(start, days, seed);
    store.insert_observations(&observations)?;

    let mut hyperparameters = Map::new();
    hyperparameters.insert("seed".to_string(), json!(seed));
    hyperparameters.insert("noise_amplitude".to_string(), json!(5.0));

    let model_id = store.insert_model(&NewModelRecord {
        name: "SalesPredictor".to_string(),
        version: "v1.0".to_string(),
        algorithm: "SeasonalTrend".to_string(),
        performance_score: 0.895,
        training_date: (start + Duration::days(days.saturating_sub(1) as i64))
            .and_hms_opt(0, 0, 0),
        is_active: true,
        hyperparameters,
        feature_columns: vec![
            "day_of_week".to_string(),
            "month".to_string(),
            "is_weekend".to_string(),
            "temperature".to_string(),
            "marketing_spend".to_string(),
        ],
    })?;

    log::info!(
        "seeded store with {} observations over {days} days (model id {model_id})",
        observations.len()
    );
    Ok(model_id)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
