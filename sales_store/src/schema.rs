//! SQLite schema: tables, indexes and the rollup views consumed by the
//! dashboard collaborator.

/// Full schema. Every statement is idempotent so the batch can run on an
/// already-initialized database.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sales_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    sales_amount REAL NOT NULL,
    quantity INTEGER NOT NULL,
    product_category TEXT,
    region TEXT,
    day_of_week INTEGER,
    month INTEGER,
    is_weekend INTEGER NOT NULL DEFAULT 0,
    temperature REAL,
    marketing_spend REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_sales_date ON sales_data(date);
CREATE INDEX IF NOT EXISTS idx_sales_category ON sales_data(product_category);
CREATE INDEX IF NOT EXISTS idx_sales_region ON sales_data(region);

CREATE TABLE IF NOT EXISTS ml_models (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version TEXT NOT NULL,
    algorithm TEXT NOT NULL,
    performance_score REAL NOT NULL DEFAULT 0,
    training_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    hyperparameters TEXT,
    feature_columns TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (name, version)
);
CREATE INDEX IF NOT EXISTS idx_models_active ON ml_models(is_active);

CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    model_id INTEGER NOT NULL REFERENCES ml_models(id),
    prediction_date TEXT NOT NULL,
    target_date TEXT NOT NULL,
    predicted_value REAL NOT NULL,
    confidence_score REAL NOT NULL DEFAULT 0.95,
    actual_value REAL,
    accuracy_error REAL,
    feature_values TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_predictions_model_target ON predictions(model_id, target_date);
CREATE INDEX IF NOT EXISTS idx_predictions_date ON predictions(prediction_date);

CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    message_type TEXT NOT NULL CHECK (message_type IN ('user', 'assistant')),
    message_content TEXT NOT NULL,
    intent_detected TEXT,
    confidence_score REAL,
    processing_time_ms INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_conversations_session ON conversations(session_id);
CREATE INDEX IF NOT EXISTS idx_conversations_type ON conversations(message_type);
CREATE INDEX IF NOT EXISTS idx_conversations_intent ON conversations(intent_detected);

CREATE TABLE IF NOT EXISTS business_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metric_name TEXT NOT NULL,
    metric_value REAL NOT NULL,
    metric_date TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('sales', 'marketing', 'ml', 'system')),
    target_value REAL,
    variance_percentage REAL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (metric_name, metric_date)
);
CREATE INDEX IF NOT EXISTS idx_metrics_category ON business_metrics(category);

CREATE VIEW IF NOT EXISTS daily_sales_summary AS
SELECT date,
       SUM(sales_amount) AS total_sales,
       SUM(quantity) AS total_quantity,
       AVG(sales_amount) AS avg_sale,
       COUNT(*) AS transaction_count,
       AVG(temperature) AS avg_temperature,
       SUM(marketing_spend) AS total_marketing_spend
FROM sales_data
GROUP BY date;

CREATE VIEW IF NOT EXISTS model_performance AS
SELECT m.id,
       m.name,
       m.version,
       m.algorithm,
       m.performance_score,
       m.is_active,
       COUNT(p.id) AS prediction_count,
       AVG(p.confidence_score) AS avg_confidence
FROM ml_models m
LEFT JOIN predictions p ON p.model_id = m.id
GROUP BY m.id;

CREATE VIEW IF NOT EXISTS recent_conversations AS
SELECT id,
       session_id,
       message_type,
       message_content,
       intent_detected,
       confidence_score,
       processing_time_ms,
       created_at
FROM conversations
ORDER BY created_at DESC, id DESC
LIMIT 50;
"#;
