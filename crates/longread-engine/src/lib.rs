//! Longread Engine
//!
//! Analyzes documents that are far longer than a single model call can take.
//!
//! # Overview
//!
//! The engine decides how a long text reaches the model. Short documents go
//! out in one call. Long ones are split at paragraph, line or sentence
//! boundaries and analyzed part by part, with an optional synthesis pass over
//! the combined results. Style analysis reads a head/middle/tail sample
//! instead. A precomputed digest (one condensed summary per chunk) can stand in
//! for the full text for the kinds that accept it.
//!
//! # Architecture
//!
//! ```text
//! Document ─┬─ Splitter ─→ Analyzer ─→ GenerationBackend ─→ AnalysisRun
//!           ├─ Sampler ──↗
//!           └─ ChunkBook ─→ Condenser ─→ Digest ─↗
//! ```
//!
//! # Key Features
//!
//! - **Boundary-aware splitting**: chunks concatenate back to the input
//! - **Streaming transcripts**: every increment reaches the sink as a running total
//! - **Digest precomputation**: per-chunk condensation with resumable retries
//! - **Prompt templates**: built-in defaults plus user-defined templates
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use longread_domain::{AnalysisKind, AnalysisRun, Document};
//! use longread_engine::{default_prompt, AnalysisInput, Analyzer, EngineConfig};
//! use longread_llm::MockBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(MockBackend::new("An outline."));
//! let analyzer = Analyzer::new(backend, EngineConfig::default())?;
//!
//! let document = Document::new("novel.txt", "Chapter 1. It was a dark night.");
//! let prompt = default_prompt(AnalysisKind::Outline);
//! let mut run = AnalysisRun::new(AnalysisKind::Outline);
//!
//! let mut sink = |total: &str| println!("{} chars so far", total.len());
//! analyzer
//!     .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut sink)
//!     .await?;
//!
//! println!("{}", run.content());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod boundary;
mod config;
mod digest;
mod error;
mod prompt;
mod sampler;
mod splitter;
mod templates;

#[cfg(test)]
mod tests;

pub use analyzer::{select_strategy, AnalysisInput, Analyzer, Strategy};
pub use config::EngineConfig;
pub use digest::{ChunkBook, CondenseReport, Condenser, Digest, StatusCounts, DIGEST_RULE};
pub use error::EngineError;
pub use prompt::{
    default_condense_prompt, default_prompt, synthesis_directive, PromptBuilder, CONTENT_DELIMITER,
};
pub use sampler::Sampler;
pub use splitter::Splitter;
pub use templates::{builtin_id, PromptDrafts, PromptTemplate, TemplateOrigin, TemplateRegistry};
