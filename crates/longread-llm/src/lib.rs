//! Longread Generation Client
//!
//! Streaming text-generation backends behind one async trait.
//!
//! # Architecture
//!
//! A backend takes a system instruction, one combined user message and a
//! reasoning level, and returns a lazy stream of text increments. The
//! concatenation of all increments is the full response. Backends never
//! retry: a failure is classified once, at this boundary, into a
//! [`GenerationError`] variant and handed to the caller.
//!
//! # Backends
//!
//! - `MockBackend`: Scripted, instrumented backend for tests
//! - `GeminiBackend`: Google Gemini `streamGenerateContent` over SSE
//! - `OllamaBackend`: Local Ollama `/api/generate` with NDJSON streaming
//!
//! # Examples
//!
//! ```
//! use longread_llm::{GenerationBackend, GenerationRequest, MockBackend, ReasoningLevel};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MockBackend::new("Hello from the model!");
//! let request = GenerationRequest::new("You are terse.", "Say hello.", ReasoningLevel::High);
//! let text = backend.generate(request).await.unwrap();
//! assert_eq!(text, "Hello from the model!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod factory;
pub mod gemini;
pub mod mock;
pub mod ollama;
mod stream;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use thiserror::Error;

pub use factory::{create_backend, BackendConfig, ProviderKind};
pub use gemini::GeminiBackend;
pub use mock::{CallEvent, MockBackend, MockReply};
pub use ollama::OllamaBackend;

/// Errors that can occur during a generation call
///
/// The variant is decided where the provider response is read, so callers
/// match on the kind instead of inspecting message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The input exceeded the model's context or token limit
    #[error("Input exceeds the model limit: {0}")]
    LengthExceeded(String),

    /// Network or transport failure before a response arrived
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status from the provider
    #[error("API error: HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error message (or raw body)
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The stream broke or reported an error after it started
    #[error("Stream error: {0}")]
    Stream(String),

    /// Response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Backend is missing required configuration
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    /// Generic error
    #[error("Generation error: {0}")]
    Other(String),
}

impl GenerationError {
    /// Whether an identical call might succeed later
    ///
    /// The engine never retries; this is for callers that add their own policy.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Communication(_)
            | GenerationError::RateLimited
            | GenerationError::Stream(_) => true,
            GenerationError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether this is the context/token limit failure
    pub fn is_length_exceeded(&self) -> bool {
        matches!(self, GenerationError::LengthExceeded(_))
    }
}

/// How much internal deliberation a call may spend before answering
///
/// Each backend maps the level onto its own configured budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasoningLevel {
    /// Literal extraction (chunk condensation)
    Low,

    /// Analysis and synthesis
    High,
}

/// One generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System instruction, passed through untouched
    pub system_instruction: String,

    /// Combined user message: instruction plus delimited content
    pub message: String,

    /// Reasoning level for this call
    pub reasoning: ReasoningLevel,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(
        system_instruction: impl Into<String>,
        message: impl Into<String>,
        reasoning: ReasoningLevel,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            message: message.into(),
            reasoning,
        }
    }
}

/// Lazy, finite sequence of text increments
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Trait for generation backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Issue one call and return its stream of increments
    async fn stream(&self, request: GenerationRequest) -> Result<TextStream, GenerationError>;

    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Issue one call and concatenate every increment
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let mut stream = self.stream(request).await?;
        let mut text = String::new();
        while let Some(piece) = stream.next().await {
            text.push_str(&piece?);
        }
        Ok(text)
    }
}

/// Markers providers use when the input is over the context limit
const LENGTH_MARKERS: &[&str] = &[
    "token count",
    "maximum number of tokens",
    "context length",
    "context window",
    "too many tokens",
    "too long",
];

/// Whether a provider message reports a context/token limit failure
pub(crate) fn mentions_length_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    LENGTH_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Pull `error.message` (or a bare `error` string) out of a JSON error body
pub(crate) fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value["error"]["message"]
            .as_str()
            .or_else(|| value["error"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Classify a non-success HTTP response
pub(crate) fn classify_api_failure(status: u16, body: &str) -> GenerationError {
    let message = extract_error_message(body);
    match status {
        429 => GenerationError::RateLimited,
        400 | 413 if mentions_length_limit(&message) => GenerationError::LengthExceeded(message),
        _ => GenerationError::Api { status, message },
    }
}
