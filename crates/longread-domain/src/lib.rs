//! Longread Domain Layer
//!
//! This crate contains the domain model shared by every other Longread crate.
//! It has ZERO external dependencies and defines the value types and the
//! callback traits that the analysis engine and its callers exchange.
//!
//! ## Key Concepts
//!
//! - **Document**: the decoded text handed over by a document provider
//! - **AnalysisKind**: which analysis is requested (summary, outline, style, ...)
//! - **PromptSpec**: the `{system, user}` instruction pair for one generation call
//! - **Chunk**: one model-sized slice of a document plus its condensation
//! - **AnalysisRun**: the append-only transcript and status of one analysis
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Plain data and state transitions only
//! - Generation backends and orchestration live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod chunk;
pub mod document;
pub mod prompt;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use analysis::AnalysisKind;
pub use chunk::{Chunk, ChunkStatus};
pub use document::Document;
pub use prompt::PromptSpec;
pub use run::{AnalysisRun, RunStatus};
pub use traits::{ChunkObserver, NoopSink, StreamSink};
