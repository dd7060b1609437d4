mod types;

pub use types::*;

use crate::Result;
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration from `CONFIG_PATH` (default `config.yaml`).
///
/// An explicitly configured path must exist. When no path is configured and
/// the default file is absent, built-in defaults are used.
pub async fn load() -> Result<Config> {
    let config_path = match env::var("CONFIG_PATH") {
        Ok(path) => path,
        Err(_) if !Path::new(DEFAULT_CONFIG_PATH).exists() => {
            debug!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
            return Ok(apply_env_overrides(Config::default()));
        }
        Err(_) => DEFAULT_CONFIG_PATH.to_string(),
    };

    debug!("Loading configuration from: {}", config_path);

    let config = load_from_path(&config_path).await?;
    Ok(apply_env_overrides(config))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = tokio::fs::read_to_string(path).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty document deserializes as null, not as an empty mapping.
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(db_path) = env::var("HISTORY_DB_PATH") {
        config.server.database_path = db_path;
    }
    if let Ok(base_url) = env::var("OLLAMA_BASE_URL") {
        config.llm.base_url = base_url;
    }
    config
}
