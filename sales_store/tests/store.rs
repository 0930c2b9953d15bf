use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

use sales_store::{
    CheckStatus, MessageType, MetricCategory, NewMessage, NewMetric, NewModelRecord,
    NewObservation, NewPrediction, SalesStore, StoreError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

fn observation(day: NaiveDate, amount: f64) -> NewObservation {
    NewObservation {
        date: day,
        sales_amount: amount,
        quantity: 2,
        product_category: "Electronics".to_string(),
        region: "North".to_string(),
        temperature: Some(15.0),
        marketing_spend: 200.0,
    }
}

fn model(name: &str, version: &str) -> NewModelRecord {
    let mut hyperparameters = Map::new();
    hyperparameters.insert("n_estimators".to_string(), json!(100));
    hyperparameters.insert("max_depth".to_string(), json!(10));
    hyperparameters.insert("random_state".to_string(), json!(42));
    NewModelRecord {
        name: name.to_string(),
        version: version.to_string(),
        algorithm: "SeasonalTrend".to_string(),
        performance_score: 0.895,
        training_date: Some(datetime(2024, 1, 1)),
        is_active: true,
        hyperparameters,
        feature_columns: vec![
            "day_of_week".to_string(),
            "month".to_string(),
            "is_weekend".to_string(),
        ],
    }
}

fn prediction(model_id: i64, made: NaiveDate, target: NaiveDate) -> NewPrediction {
    NewPrediction {
        model_id,
        prediction_date: made,
        target_date: target,
        predicted_value: 150.0,
        confidence_score: 0.95,
        feature_values: Map::new(),
    }
}

#[test]
fn schema_init_is_idempotent() {
    let store = SalesStore::open_in_memory().unwrap();
    store.init_schema().unwrap();
    store.init_schema().unwrap();
}

#[test]
fn observation_round_trip_fills_calendar_cache() {
    let store = SalesStore::open_in_memory().unwrap();
    // 2024-03-02 was a Saturday
    let stored = store
        .insert_observation(&observation(date(2024, 3, 2), 99.5))
        .unwrap();

    assert_eq!(stored.date, date(2024, 3, 2));
    assert_eq!(stored.day_of_week, 5);
    assert_eq!(stored.month, 3);
    assert!(stored.is_weekend);
    assert_eq!(stored.sales_amount, 99.5);

    let fetched = store.observation(stored.id).unwrap();
    assert_eq!(fetched, stored);
}

#[test]
fn negative_sales_amount_is_rejected_not_coerced() {
    let store = SalesStore::open_in_memory().unwrap();
    let err = store
        .insert_observation(&observation(date(2024, 3, 2), -1.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::DataQualityViolation(_)));
    assert_eq!(store.sales_stats().unwrap().total_records, 0);
}

#[test]
fn daily_total_distinguishes_absence_from_zero() {
    let store = SalesStore::open_in_memory().unwrap();
    store
        .insert_observations(&[
            observation(date(2024, 3, 1), 100.0),
            observation(date(2024, 3, 1), 50.0),
            observation(date(2024, 3, 2), 0.0),
        ])
        .unwrap();

    assert_eq!(store.daily_total(date(2024, 3, 1)).unwrap(), Some(150.0));
    assert_eq!(store.daily_total(date(2024, 3, 2)).unwrap(), Some(0.0));
    assert_eq!(store.daily_total(date(2024, 3, 3)).unwrap(), None);
    assert_eq!(
        store.window_total(date(2024, 3, 1), date(2024, 3, 7)).unwrap(),
        150.0
    );
}

#[test]
fn daily_summary_view_rolls_up_per_date() {
    let store = SalesStore::open_in_memory().unwrap();
    store
        .insert_observations(&[
            observation(date(2024, 3, 1), 100.0),
            observation(date(2024, 3, 1), 60.0),
            observation(date(2024, 3, 2), 10.0),
        ])
        .unwrap();

    let summaries = store
        .daily_summaries(date(2024, 3, 1), date(2024, 3, 2))
        .unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].date, date(2024, 3, 1));
    assert_eq!(summaries[0].total_sales, 160.0);
    assert_eq!(summaries[0].transaction_count, 2);
    assert_eq!(summaries[0].total_quantity, 4);
    assert_eq!(summaries[1].total_sales, 10.0);
}

#[test]
fn duplicate_model_version_is_a_conflict() {
    let store = SalesStore::open_in_memory().unwrap();
    store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    let err = store
        .insert_model(&model("SalesPredictor", "v1.0"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateVersion { .. }));

    // A different version of the same name is fine.
    store.insert_model(&model("SalesPredictor", "v1.1")).unwrap();
}

#[test]
fn model_json_columns_round_trip() {
    let store = SalesStore::open_in_memory().unwrap();
    let rec = model("SalesPredictor", "v1.0");
    let id = store.insert_model(&rec).unwrap();
    let fetched = store.model(id).unwrap();

    assert_eq!(fetched.hyperparameters, rec.hyperparameters);
    assert_eq!(
        fetched
            .hyperparameters
            .keys()
            .cloned()
            .collect::<Vec<String>>(),
        vec!["n_estimators", "max_depth", "random_state"]
    );
    assert_eq!(fetched.feature_columns, rec.feature_columns);
}

#[test]
fn active_model_prefers_most_recent_training_date() {
    let store = SalesStore::open_in_memory().unwrap();
    let mut v1 = model("SalesPredictor", "v1.0");
    v1.training_date = Some(datetime(2024, 1, 1));
    let mut v2 = model("SalesPredictor", "v2.0");
    v2.training_date = Some(datetime(2024, 2, 1));

    let id1 = store.insert_model(&v1).unwrap();
    let id2 = store.insert_model(&v2).unwrap();

    // Both rows are active at once; resolution must pick the newer training.
    let active = store.active_model("SalesPredictor").unwrap().unwrap();
    assert_eq!(active.id, id2);

    // Deactivating the newer row falls back to the older one.
    store.set_model_active(id2, false).unwrap();
    let active = store.active_model("SalesPredictor").unwrap().unwrap();
    assert_eq!(active.id, id1);
}

#[test]
fn active_model_ties_break_on_highest_id() {
    let store = SalesStore::open_in_memory().unwrap();
    let mut first = model("SalesPredictor", "v1.0");
    first.training_date = Some(datetime(2024, 1, 1));
    let mut second = model("SalesPredictor", "v1.1");
    second.training_date = Some(datetime(2024, 1, 1));

    store.insert_model(&first).unwrap();
    let id2 = store.insert_model(&second).unwrap();

    let active = store.active_model("SalesPredictor").unwrap().unwrap();
    assert_eq!(active.id, id2);
}

#[test]
fn activation_does_not_deactivate_siblings() {
    let store = SalesStore::open_in_memory().unwrap();
    let id1 = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    let id2 = store.insert_model(&model("SalesPredictor", "v2.0")).unwrap();

    store.set_model_active(id1, true).unwrap();
    store.set_model_active(id2, true).unwrap();

    let active = store.models(true).unwrap();
    assert_eq!(active.len(), 2);
}

#[test]
fn missing_model_is_not_found() {
    let store = SalesStore::open_in_memory().unwrap();
    assert!(matches!(store.model(99), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.set_model_active(99, true),
        Err(StoreError::NotFound(_))
    ));
    assert!(store.active_model("SalesPredictor").unwrap().is_none());
}

#[test]
fn deleting_a_model_with_predictions_is_rejected() {
    let store = SalesStore::open_in_memory().unwrap();
    let id = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    store
        .insert_prediction(&prediction(id, date(2024, 3, 1), date(2024, 3, 2)))
        .unwrap();

    let err = store.delete_model(id).unwrap_err();
    assert!(matches!(err, StoreError::ModelInUse { predictions: 1, .. }));

    // The model is still there and still resolvable.
    assert!(store.model(id).is_ok());
}

#[test]
fn prediction_resolution_is_write_once() {
    let store = SalesStore::open_in_memory().unwrap();
    let model_id = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    let stored = store
        .insert_prediction(&prediction(model_id, date(2024, 3, 1), date(2024, 3, 2)))
        .unwrap();
    assert!(!stored.is_resolved());

    assert!(store.resolve_prediction(stored.id, 140.0, 10.0).unwrap());
    let resolved = store.prediction(stored.id).unwrap();
    assert_eq!(resolved.actual_value, Some(140.0));
    assert_eq!(resolved.accuracy_error, Some(10.0));

    // A second resolution attempt is a no-op, even with different values.
    assert!(!store.resolve_prediction(stored.id, 999.0, -849.0).unwrap());
    assert_eq!(store.prediction(stored.id).unwrap(), resolved);
}

#[test]
fn unresolved_predictions_filter_by_target_date() {
    let store = SalesStore::open_in_memory().unwrap();
    let model_id = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    let past = store
        .insert_prediction(&prediction(model_id, date(2024, 3, 1), date(2024, 3, 2)))
        .unwrap();
    store
        .insert_prediction(&prediction(model_id, date(2024, 3, 1), date(2024, 3, 9)))
        .unwrap();

    let due = store.unresolved_predictions(date(2024, 3, 5)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, past.id);

    store.resolve_prediction(past.id, 150.0, 0.0).unwrap();
    assert!(store.unresolved_predictions(date(2024, 3, 5)).unwrap().is_empty());
}

#[test]
fn metric_upsert_replaces_instead_of_duplicating() {
    let store = SalesStore::open_in_memory().unwrap();
    let metric = NewMetric {
        metric_name: "daily_sales_total".to_string(),
        metric_value: 100.0,
        metric_date: date(2024, 3, 1),
        category: MetricCategory::Sales,
        target_value: Some(80.0),
    };

    let first = store.upsert_metric(&metric).unwrap();
    assert_eq!(first.metric_value, 100.0);
    assert_eq!(first.variance_percentage, Some(25.0));

    let second = store
        .upsert_metric(&NewMetric {
            metric_value: 120.0,
            ..metric.clone()
        })
        .unwrap();
    assert_eq!(second.metric_value, 120.0);

    let rows = store.metrics_between(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].metric_value, 120.0);
}

#[test]
fn latest_metrics_pick_newest_row_per_name() {
    let store = SalesStore::open_in_memory().unwrap();
    for (day, value) in [(1, 100.0), (2, 200.0)] {
        store
            .upsert_metric(&NewMetric {
                metric_name: "daily_sales_total".to_string(),
                metric_value: value,
                metric_date: date(2024, 3, day),
                category: MetricCategory::Sales,
                target_value: None,
            })
            .unwrap();
    }
    store
        .upsert_metric(&NewMetric {
            metric_name: "model_accuracy_avg".to_string(),
            metric_value: 89.5,
            metric_date: date(2024, 3, 1),
            category: MetricCategory::Ml,
            target_value: None,
        })
        .unwrap();

    let latest = store.latest_metrics().unwrap();
    assert_eq!(latest.len(), 2);
    let sales = latest
        .iter()
        .find(|m| m.metric_name == "daily_sales_total")
        .unwrap();
    assert_eq!(sales.metric_date, date(2024, 3, 2));
    assert_eq!(sales.metric_value, 200.0);
}

#[test]
fn conversation_log_round_trips() {
    let store = SalesStore::open_in_memory().unwrap();
    let saved = store
        .save_message(&NewMessage {
            session_id: "demo".to_string(),
            message_type: MessageType::User,
            message_content: "Predict tomorrow's sales".to_string(),
            intent_detected: Some("prediction".to_string()),
            confidence_score: Some(0.92),
            processing_time_ms: Some(120),
        })
        .unwrap();
    assert_eq!(saved.message_type, MessageType::User);

    let history = store.conversation_history("demo", 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].intent_detected.as_deref(), Some("prediction"));

    let recent = store.recent_conversations().unwrap();
    assert_eq!(recent.len(), 1);
}

#[test]
fn model_performance_view_counts_predictions() {
    let store = SalesStore::open_in_memory().unwrap();
    let model_id = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();
    for day in 2..5 {
        store
            .insert_prediction(&prediction(model_id, date(2024, 3, 1), date(2024, 3, day)))
            .unwrap();
    }

    let summary = store.model_performance_summary().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].prediction_count, 3);
    assert_eq!(summary[0].avg_confidence, Some(0.95));

    let for_model = store.predictions_for_model(model_id, 2).unwrap();
    assert_eq!(for_model.len(), 2);
    assert!(for_model.iter().all(|p| p.model_id == model_id));

    let recent = store.recent_predictions(10).unwrap();
    assert_eq!(recent.len(), 3);
}

#[test]
fn quality_checks_flag_an_empty_store() {
    let store = SalesStore::open_in_memory().unwrap();
    let checks = store.data_quality_checks(date(2024, 3, 1)).unwrap();
    assert_eq!(checks.len(), 5);

    let recent = checks
        .iter()
        .find(|c| c.check_name == "Recent Sales Data")
        .unwrap();
    assert_eq!(recent.status, CheckStatus::Failed);

    let models = checks
        .iter()
        .find(|c| c.check_name == "Active ML Models")
        .unwrap();
    assert_eq!(models.status, CheckStatus::Warning);
}

#[test]
fn quality_checks_pass_on_fresh_data() {
    let store = SalesStore::open_in_memory().unwrap();
    store
        .insert_observation(&observation(date(2024, 3, 1), 100.0))
        .unwrap();
    store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();

    let checks = store.data_quality_checks(date(2024, 3, 2)).unwrap();
    assert!(checks.iter().all(|c| c.status == CheckStatus::Passed));
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.db");

    {
        let store = SalesStore::open(&path).unwrap();
        store
            .insert_observation(&observation(date(2024, 3, 1), 42.0))
            .unwrap();
    }

    let reopened = SalesStore::open(&path).unwrap();
    assert_eq!(reopened.sales_stats().unwrap().total_records, 1);
    assert_eq!(reopened.daily_total(date(2024, 3, 1)).unwrap(), Some(42.0));
}

#[test]
fn stats_on_empty_store_are_zeroed() {
    let store = SalesStore::open_in_memory().unwrap();
    let stats = store.sales_stats().unwrap();
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.total_sales, 0.0);
    assert_eq!(stats.earliest_date, None);
    assert_eq!(stats.latest_date, None);
}

#[test]
fn feature_values_round_trip_on_predictions() {
    let store = SalesStore::open_in_memory().unwrap();
    let model_id = store.insert_model(&model("SalesPredictor", "v1.0")).unwrap();

    let mut features = Map::new();
    features.insert("day_of_week".to_string(), json!(5));
    features.insert("month".to_string(), json!(3));
    features.insert("is_weekend".to_string(), Value::Bool(true));

    let mut pred = prediction(model_id, date(2024, 3, 1), date(2024, 3, 2));
    pred.feature_values = features.clone();

    let stored = store.insert_prediction(&pred).unwrap();
    assert_eq!(stored.feature_values, features);
}
