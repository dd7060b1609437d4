use crate::advice::CureInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: f32,
    pub cure_info: CureInfo,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub classes: usize,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
