use async_trait::async_trait;
use plant_doctor::{
    Error, Result,
    llm::{GenerateRequest, GenerateResponse, TextGenerator},
    vision::FrozenModel,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tract_onnx::prelude::tract_ndarray::Array4;

/// Mock text generator for testing
#[derive(Debug)]
pub struct MockGenerator {
    pub responses: Arc<Mutex<Vec<GenerateResponse>>>,
    pub requests: Arc<Mutex<Vec<(GenerateRequest, Duration)>>>,
    pub error: Option<String>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_text(self, text: &str) -> Self {
        self.responses.lock().unwrap().push(GenerateResponse {
            response: Some(serde_json::Value::from(text)),
            ..Default::default()
        });
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn get_requests(&self) -> Vec<(GenerateRequest, Duration)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerateRequest,
        timeout: Duration,
    ) -> Result<GenerateResponse> {
        self.requests.lock().unwrap().push((request, timeout));

        if let Some(ref error) = self.error {
            return Err(Error::internal(error.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::internal("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Model that ignores its input and always emits the same scores
pub struct StubModel {
    pub scores: Vec<f32>,
}

impl FrozenModel for StubModel {
    fn scores(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        Ok(self.scores.clone())
    }

    fn num_classes(&self) -> Option<usize> {
        Some(self.scores.len())
    }
}
