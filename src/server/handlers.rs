use super::types::*;
use crate::{
    Error,
    advice::Advisor,
    history::{HistoryStorage, PredictionRecord},
    vision::DiseaseClassifier,
};
use axum::{
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const NO_IMAGE: &str = "No image uploaded";
pub const NO_MESSAGE: &str = "No message provided";
const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<DiseaseClassifier>,
    pub advisor: Arc<Advisor>,
    pub history: Arc<HistoryStorage>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn upload_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeds body limit: {}", e);
        return api_error(StatusCode::PAYLOAD_TOO_LARGE, "Image too large");
    }
    api_error(StatusCode::BAD_REQUEST, format!("Malformed upload: {e}"))
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(api_error(StatusCode::BAD_REQUEST, NO_IMAGE));
    };

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() == Some("image") {
            let bytes = field.bytes().await.map_err(upload_error)?;
            image = Some(bytes);
            break;
        }
    }

    let image = match image {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(api_error(StatusCode::BAD_REQUEST, NO_IMAGE)),
    };
    info!("Received image of {} bytes", image.len());

    let classifier = state.classifier.clone();
    let prediction = tokio::task::spawn_blocking(move || classifier.classify(&image))
        .await
        .map_err(|e| {
            error!("Inference task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Inference task failed")
        })?
        .map_err(|e| {
            if e.is_client_error() {
                warn!("Rejected upload: {}", e);
                api_error(StatusCode::BAD_REQUEST, e.to_string())
            } else {
                error!("Classification failed: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    info!(
        "Predicted '{}' (score {:.4})",
        prediction.label, prediction.confidence
    );

    let cure_info = state.advisor.cure_for(&prediction.label).await;

    if let Err(e) = state
        .history
        .save(PredictionRecord::new(&prediction.label, prediction.confidence))
        .await
    {
        warn!("Failed to record prediction: {}", e);
    }

    Ok(Json(PredictResponse {
        prediction: prediction.label,
        confidence: prediction.confidence,
        cure_info,
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = match request {
        Ok(Json(request)) => request.message,
        Err(rejection) => {
            warn!("Rejected chat request: {}", rejection.body_text());
            return Err(api_error(StatusCode::BAD_REQUEST, NO_MESSAGE));
        }
    };

    if message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, NO_MESSAGE));
    }

    match state.advisor.chat(&message).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(Error::Llm { status, body }) => {
            error!("LLM returned {} for chat: {}", status, body);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Ollama error"))
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        classes: state.classifier.classes().len(),
    })
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<PredictionRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    state.history.list(limit).await.map(Json).map_err(|e| {
        error!("Failed to list history: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}
