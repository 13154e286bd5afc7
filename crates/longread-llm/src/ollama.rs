//! Ollama Backend Implementation
//!
//! Provides integration with Ollama's local generation API, for running
//! analyses on local models for privacy and cost savings.
//!
//! # Features
//!
//! - Streaming `/api/generate` (newline-delimited JSON)
//! - Configurable endpoint and model
//! - Optional `think` flag driven by the reasoning level
//! - Connect timeout only; a streaming call may run as long as the model needs
//!
//! # Examples
//!
//! ```no_run
//! use longread_llm::OllamaBackend;
//!
//! // Create an Ollama backend
//! let backend = OllamaBackend::new("http://localhost:11434", "qwen3");
//!
//! // Reasoning models can be told to think for analysis calls
//! let backend = backend.with_thinking(true);
//! ```

use crate::stream::text_stream;
use crate::{
    classify_api_failure, mentions_length_limit, GenerationBackend, GenerationError,
    GenerationRequest, ReasoningLevel, TextStream,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Ollama API backend for local generation
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    thinking: bool,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

/// One streamed line from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateLine {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "qwen3", "llama3.1")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            thinking: false,
        }
    }

    /// Create a new Ollama backend with the default endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Send `think` with every call: true for high reasoning, false for low
    ///
    /// Only enable this for models that support thinking; others reject the flag.
    pub fn with_thinking(mut self, thinking: bool) -> Self {
        self.thinking = thinking;
        self
    }

    fn think_flag(&self, level: ReasoningLevel) -> Option<bool> {
        self.thinking.then_some(level == ReasoningLevel::High)
    }
}

/// Parse one NDJSON line from the Ollama stream
pub(crate) fn parse_ndjson_line(line: &str) -> Result<Option<String>, GenerationError> {
    let parsed: OllamaGenerateLine = serde_json::from_str(line)
        .map_err(|e| GenerationError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = parsed.error {
        if mentions_length_limit(&error) {
            return Err(GenerationError::LengthExceeded(error));
        }
        return Err(GenerationError::Stream(error));
    }

    Ok(if parsed.response.is_empty() {
        None
    } else {
        Some(parsed.response)
    })
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn stream(&self, request: GenerationRequest) -> Result<TextStream, GenerationError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.message,
            system: &request.system_instruction,
            stream: true,
            think: self.think_flag(request.reasoning),
        };

        debug!(
            "Ollama request to model={} (message {} chars)",
            self.model,
            request.message.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_api_failure(status.as_u16(), &text));
        }

        Ok(text_stream(response.bytes_stream(), parse_ndjson_line))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
