//! Gemini Backend Implementation
//!
//! Streams responses from the Google Gemini API using
//! `models/{model}:streamGenerateContent?alt=sse`.
//!
//! # Features
//!
//! - Separate `systemInstruction` and a single combined user turn
//! - Reasoning level mapped onto `thinkingConfig.thinkingBudget`
//! - Thought parts are dropped; only answer text is streamed
//! - No retries and no overall request timeout: long novels stream for minutes
//!
//! # Examples
//!
//! ```no_run
//! use longread_llm::GeminiBackend;
//!
//! let backend = GeminiBackend::new("api-key", "gemini-2.5-pro")
//!     .with_reasoning_budgets(128, 8192);
//! ```

use crate::stream::text_stream;
use crate::{
    classify_api_failure, extract_error_message, mentions_length_limit, GenerationBackend,
    GenerationError, GenerationRequest, ReasoningLevel, TextStream,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default thinking budget for condensation calls (2.5 Pro rejects 0)
pub const DEFAULT_LOW_BUDGET: u32 = 128;

/// Default thinking budget for analysis and synthesis calls
pub const DEFAULT_HIGH_BUDGET: u32 = 8192;

/// Gemini API backend
pub struct GeminiBackend {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    low_budget: u32,
    high_budget: u32,
}

impl GeminiBackend {
    /// Create a new Gemini backend against the public endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            low_budget: DEFAULT_LOW_BUDGET,
            high_budget: DEFAULT_HIGH_BUDGET,
        }
    }

    /// Override the API endpoint (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the thinking budgets used for the low and high reasoning levels
    pub fn with_reasoning_budgets(mut self, low: u32, high: u32) -> Self {
        self.low_budget = low;
        self.high_budget = high;
        self
    }

    /// Thinking budget for a reasoning level
    pub fn budget_for(&self, level: ReasoningLevel) -> u32 {
        match level {
            ReasoningLevel::Low => self.low_budget,
            ReasoningLevel::High => self.high_budget,
        }
    }

    /// Build the request body for `streamGenerateContent`
    fn build_request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.message }],
            }],
            "generationConfig": {
                "thinkingConfig": {
                    "thinkingBudget": self.budget_for(request.reasoning),
                },
            },
        });

        if !request.system_instruction.trim().is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": request.system_instruction }],
            });
        }

        body
    }
}

/// Parse one SSE line from the Gemini stream
///
/// Returns the concatenated non-thought text of the event, if any.
pub(crate) fn parse_sse_line(line: &str) -> Result<Option<String>, GenerationError> {
    let Some(data) = line.strip_prefix("data:") else {
        // event:, id:, comments
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let event: Value = serde_json::from_str(data)
        .map_err(|e| GenerationError::InvalidResponse(format!("Failed to parse event: {}", e)))?;

    if event.get("error").is_some() {
        let message = extract_error_message(data);
        if mentions_length_limit(&message) {
            return Err(GenerationError::LengthExceeded(message));
        }
        return Err(GenerationError::Stream(message));
    }

    if let Some(reason) = event["promptFeedback"]["blockReason"].as_str() {
        return Err(GenerationError::InvalidResponse(format!(
            "Prompt blocked: {}",
            reason
        )));
    }

    let text: String = event["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part["thought"].as_bool().unwrap_or(false))
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    Ok(if text.is_empty() { None } else { Some(text) })
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn stream(&self, request: GenerationRequest) -> Result<TextStream, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.endpoint, self.model
        );
        let body = self.build_request_body(&request);

        debug!(
            "Gemini request to model={} (message {} chars, budget {})",
            self.model,
            request.message.chars().count(),
            self.budget_for(request.reasoning)
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_api_failure(status.as_u16(), &text));
        }

        Ok(text_stream(response.bytes_stream(), parse_sse_line))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
