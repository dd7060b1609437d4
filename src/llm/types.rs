use serde::{Deserialize, Serialize};

/// Body of a `POST /api/generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    /// `"json"` constrains the output to a JSON document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            format: None,
        }
    }

    pub fn json(mut self) -> Self {
        self.format = Some("json".to_string());
        self
    }
}

/// Non-streaming reply. Only `response` is used; the rest is informational.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: Option<String>,
    /// Usually a string. Kept as a raw value since it may already be structured.
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub done: Option<bool>,
}

impl GenerateResponse {
    /// The reply as text; structured replies are re-serialized.
    pub fn text(&self) -> String {
        match &self.response {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
