//! Backend configuration and construction

use crate::{GeminiBackend, GenerationBackend, GenerationError, MockBackend, OllamaBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini API
    Gemini,
    /// Local Ollama server
    Ollama,
    /// Offline mock that echoes a fixed reply
    Mock,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Gemini
    }
}

/// Settings for building a generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend provider
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint override; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Reasoning budget for condensation calls
    #[serde(default = "default_low_budget")]
    pub low_reasoning_budget: u32,

    /// Reasoning budget for analysis and synthesis calls
    #[serde(default = "default_high_budget")]
    pub high_reasoning_budget: u32,

    /// Send Ollama's `think` flag (only for models that support it)
    #[serde(default)]
    pub ollama_thinking: bool,
}

fn default_model() -> String {
    crate::gemini::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_low_budget() -> u32 {
    crate::gemini::DEFAULT_LOW_BUDGET
}

fn default_high_budget() -> u32 {
    crate::gemini::DEFAULT_HIGH_BUDGET
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            endpoint: None,
            api_key_env: default_api_key_env(),
            low_reasoning_budget: default_low_budget(),
            high_reasoning_budget: default_high_budget(),
            ollama_thinking: false,
        }
    }
}

/// Create the backend described by `config`
///
/// The Gemini key is read from the environment variable named in the config;
/// a missing or empty key is reported as `NotConfigured`.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
    match config.provider {
        ProviderKind::Gemini => {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    GenerationError::NotConfigured(format!("{} not set", config.api_key_env))
                })?;
            let mut backend = GeminiBackend::new(api_key, config.model.clone()).with_reasoning_budgets(
                config.low_reasoning_budget,
                config.high_reasoning_budget,
            );
            if let Some(endpoint) = &config.endpoint {
                backend = backend.with_endpoint(endpoint.clone());
            }
            Ok(Arc::new(backend))
        }
        ProviderKind::Ollama => {
            let endpoint = config
                .endpoint
                .clone()
                .unwrap_or_else(|| crate::ollama::DEFAULT_ENDPOINT.to_string());
            Ok(Arc::new(
                OllamaBackend::new(endpoint, config.model.clone()).with_thinking(config.ollama_thinking),
            ))
        }
        ProviderKind::Mock => Ok(Arc::new(MockBackend::new(format!(
            "[mock {} response]",
            config.model
        )))),
    }
}
