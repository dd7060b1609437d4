pub mod handlers;
mod types;

pub use types::*;

use crate::{
    Error, Result,
    advice::Advisor,
    config::{Config, ServerConfig},
    history::HistoryStorage,
    llm::OllamaClient,
    vision::DiseaseClassifier,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub fn router(state: AppState, config: &ServerConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/predict", post(handlers::predict))
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| Error::config(format!("Invalid CORS origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(origins))
}

pub async fn run(config: Config) -> Result<()> {
    let model_config = config.model.clone();
    let classifier = tokio::task::spawn_blocking(move || DiseaseClassifier::load(&model_config))
        .await
        .map_err(|e| Error::internal(format!("Model loading task failed: {e}")))??;

    let generator = OllamaClient::new(&config.llm);
    info!("Using LLM endpoint {} ({})", generator.endpoint(), config.llm.model);
    let advisor = Advisor::new(Arc::new(generator), &config.llm);

    let history = HistoryStorage::new(&config.server.database_path).await?;

    let app_state = AppState {
        classifier: Arc::new(classifier),
        advisor: Arc::new(advisor),
        history: Arc::new(history),
    };

    let app = router(app_state, &config.server)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
