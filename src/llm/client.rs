use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one non-streaming generation request, bounded by `timeout`.
    ///
    /// A non-success status is reported as [`Error::Llm`]; transport failures
    /// and timeouts as [`Error::Network`].
    async fn generate(
        &self,
        request: GenerateRequest,
        timeout: Duration,
    ) -> Result<GenerateResponse>;
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_client(reqwest::Client::new(), &config.base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        request: GenerateRequest,
        timeout: Duration,
    ) -> Result<GenerateResponse> {
        debug!(
            "Sending generate request to {} (model: {}, format: {:?})",
            self.endpoint, request.model, request.format
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        debug!("Received generate response from {:?}", body.model);
        Ok(body)
    }
}
