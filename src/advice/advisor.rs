use super::prompts::{chat_prompt, cure_prompt};
use crate::{
    Error, Result,
    config::LlmConfig,
    llm::{GenerateRequest, TextGenerator},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, warn};

pub const SERVICE_DOWN_FALLBACK: &str = "Could not fetch AI cure. AI service might be down.";
pub const CONSULT_EXPERT_FALLBACK: &str = "Could not fetch AI cure. Please consult an expert.";

/// Treatment advice for one disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub symptoms: Value,
    pub cure: Value,
    pub prevention: Value,
}

/// Advice as returned to clients: structured when the model cooperated,
/// otherwise whatever text it (or the fallback path) produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CureInfo {
    Advice(Advice),
    Text(String),
    /// A non-string `response` without the advice keys, passed through as is.
    Json(Value),
}

impl CureInfo {
    pub fn healthy() -> Self {
        Self::Advice(Advice {
            symptoms: Value::from("None"),
            cure: Value::from("Your plant looks healthy! Keep up the good work."),
            prevention: Value::from("Continue regular care."),
        })
    }

    /// Normalizes the `response` field of a generate reply.
    ///
    /// Strings are parsed as JSON; an object carrying all three advice keys
    /// becomes [`CureInfo::Advice`] (other keys dropped). Anything else is
    /// kept unchanged: strings as text, other values as JSON. A missing
    /// `response` becomes an empty object.
    pub fn from_response(response: Option<Value>) -> Self {
        match response {
            Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed) => Self::advice_from(&parsed).unwrap_or(Self::Text(text)),
                Err(_) => Self::Text(text),
            },
            Some(value) => Self::advice_from(&value).unwrap_or(Self::Json(value)),
            None => Self::Json(Value::Object(Map::new())),
        }
    }

    fn advice_from(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self::Advice(Advice {
            symptoms: object.get("symptoms")?.clone(),
            cure: object.get("cure")?.clone(),
            prevention: object.get("prevention")?.clone(),
        }))
    }
}

pub fn is_healthy(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}

/// Builds prompts, calls the text service and normalizes what comes back.
pub struct Advisor {
    generator: Arc<dyn TextGenerator>,
    model: String,
    advice_timeout: Duration,
    chat_timeout: Duration,
}

impl Advisor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &LlmConfig) -> Self {
        Self {
            generator,
            model: config.model.clone(),
            advice_timeout: Duration::from_secs(config.advice_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        }
    }

    /// Never fails: service errors become a fallback message.
    pub async fn cure_for(&self, disease: &str) -> CureInfo {
        if is_healthy(disease) {
            debug!("'{}' is healthy, skipping LLM call", disease);
            return CureInfo::healthy();
        }

        let request = GenerateRequest::new(&self.model, cure_prompt(disease)).json();
        match self.generator.generate(request, self.advice_timeout).await {
            Ok(reply) => CureInfo::from_response(reply.response),
            Err(Error::Llm { status, body }) => {
                warn!("LLM returned {} while fetching cure: {}", status, body);
                CureInfo::Text(SERVICE_DOWN_FALLBACK.to_string())
            }
            Err(e) => {
                error!("Failed to fetch cure for '{}': {}", disease, e);
                CureInfo::Text(CONSULT_EXPERT_FALLBACK.to_string())
            }
        }
    }

    pub async fn chat(&self, message: &str) -> Result<String> {
        let request = GenerateRequest::new(&self.model, chat_prompt(message));
        let reply = self.generator.generate(request, self.chat_timeout).await?;
        Ok(reply.text())
    }
}
