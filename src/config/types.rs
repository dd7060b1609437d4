use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_class_indices_path")]
    pub class_indices_path: String,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default)]
    pub layout: TensorLayout,
}

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, the Keras default.
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`.
    Nchw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_advice_timeout")]
    pub advice_timeout_secs: u64,
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            database_path: default_database_path(),
            body_limit_bytes: default_body_limit(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            class_indices_path: default_class_indices_path(),
            input_size: default_input_size(),
            layout: TensorLayout::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            advice_timeout_secs: default_advice_timeout(),
            chat_timeout_secs: default_chat_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    "history.db".to_string()
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_model_path() -> String {
    "trained_model/plant_disease_prediction_model.onnx".to_string()
}

fn default_class_indices_path() -> String {
    "trained_model/class_indices.json".to_string()
}

fn default_input_size() -> u32 {
    224
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_advice_timeout() -> u64 {
    30
}

fn default_chat_timeout() -> u64 {
    60
}
