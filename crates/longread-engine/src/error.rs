//! Error types for the analysis engine

use longread_llm::GenerationError;
use thiserror::Error;

/// Errors that can occur during analysis or digest precomputation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The document is empty or whitespace only; no call was made
    #[error("Document is empty or unreadable")]
    EmptyInput,

    /// A segment still exceeded the model limit after chunking
    #[error("Document too long even after chunking: a single segment still exceeds the model limit ({0})")]
    LengthExceeded(String),

    /// Any other generation failure, with the backend's own description
    #[error(transparent)]
    Generation(GenerationError),

    /// Chunk index outside the current chunk set
    #[error("Chunk {index} out of range ({count} chunks)")]
    ChunkOutOfRange {
        /// Requested index
        index: usize,
        /// Number of chunks
        count: usize,
    },

    /// Template registry error
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<GenerationError> for EngineError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::LengthExceeded(detail) => EngineError::LengthExceeded(detail),
            other => EngineError::Generation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_exceeded_is_rewritten() {
        let err: EngineError = GenerationError::LengthExceeded("input token count 2000000".into()).into();
        assert!(matches!(err, EngineError::LengthExceeded(_)));
        assert!(err.to_string().starts_with("Document too long even after chunking"));
    }

    #[test]
    fn test_other_failures_keep_their_description() {
        let source = GenerationError::Communication("connection reset".into());
        let err: EngineError = source.clone().into();
        assert_eq!(err.to_string(), source.to_string());
    }
}
