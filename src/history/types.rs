use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Option<i64>,
    pub label: String,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            id: None,
            label: label.into(),
            confidence,
            created_at: Utc::now(),
        }
    }
}
