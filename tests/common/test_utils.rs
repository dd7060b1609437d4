use super::mocks::StubModel;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use image::{ImageFormat, Rgb, RgbImage};
use plant_doctor::{
    advice::Advisor,
    config::{Config, LlmConfig, ModelConfig},
    history::HistoryStorage,
    llm::TextGenerator,
    server::{self, handlers::AppState},
    vision::{ClassIndex, DiseaseClassifier},
};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;

pub const BOUNDARY: &str = "plantdoctorboundary";

/// Labels used by every test classifier, in model output order
pub const TEST_CLASSES: [&str; 3] = ["Apple___Apple_scab", "Apple___Black_rot", "Apple___healthy"];

/// Scores that make the stub model predict `TEST_CLASSES[index]`
pub fn scores_for(index: usize) -> Vec<f32> {
    let mut scores = vec![0.05; TEST_CLASSES.len()];
    scores[index] = 0.9;
    scores
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.database_path = ":memory:".to_string();
    config
}

/// Build the full router around a stub model and the given text generator
pub async fn create_test_app(
    scores: Vec<f32>,
    generator: Arc<dyn TextGenerator>,
) -> (Router, Arc<HistoryStorage>) {
    let config = create_test_config();
    create_test_app_with(scores, generator, &config.llm).await
}

pub async fn create_test_app_with(
    scores: Vec<f32>,
    generator: Arc<dyn TextGenerator>,
    llm: &LlmConfig,
) -> (Router, Arc<HistoryStorage>) {
    let mut config = create_test_config();
    config.llm = llm.clone();
    create_test_app_from(scores, generator, &config).await
}

/// Build the router with a caller-provided config (server limits, CORS, LLM timeouts)
pub async fn create_test_app_from(
    scores: Vec<f32>,
    generator: Arc<dyn TextGenerator>,
    config: &Config,
) -> (Router, Arc<HistoryStorage>) {
    let classes: ClassIndex = TEST_CLASSES.iter().map(|s| s.to_string()).collect();
    let classifier = DiseaseClassifier::new(
        Box::new(StubModel { scores }),
        classes,
        &ModelConfig::default(),
    )
    .unwrap();

    let history = Arc::new(HistoryStorage::new(":memory:").await.unwrap());
    let state = AppState {
        classifier: Arc::new(classifier),
        advisor: Arc::new(Advisor::new(generator, &config.llm)),
        history: history.clone(),
    };

    (server::router(state, &config.server).unwrap(), history)
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(32, 32, Rgb([60, 140, 50]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_fn(48, 48, |x, y| Rgb([(x * 5) as u8, (y * 5) as u8, 90]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// Encode a single file field as multipart/form-data
pub fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"leaf.img\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn predict_request(field: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, bytes)))
        .unwrap()
}

pub fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
