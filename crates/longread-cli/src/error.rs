//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] longread_engine::EngineError),

    /// Backend construction error
    #[error(transparent)]
    Backend(#[from] longread_llm::GenerationError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some analyses or chunks did not finish
    #[error("{failed} of {total} {what} failed")]
    Incomplete {
        /// Number of failures
        failed: usize,
        /// Number attempted
        total: usize,
        /// What was attempted
        what: &'static str,
    },
}
