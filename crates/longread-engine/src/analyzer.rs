//! Analysis orchestration
//!
//! `Analyzer` turns one analysis request into a sequence of generation calls
//! and streams everything into the run's transcript. The strategy is chosen
//! up front from the kind and whether a usable digest exists:
//!
//! - **Digest**: a complete digest replaces the document, one call
//! - **Sampled**: style analysis over a head/middle/tail sample, one call
//! - **Chunked**: one call per chunk, plus an optional synthesis call
//!
//! Calls run strictly one after another.

use crate::config::EngineConfig;
use crate::digest::Digest;
use crate::error::EngineError;
use crate::prompt::{synthesis_directive, PromptBuilder};
use futures::StreamExt;
use longread_domain::{AnalysisKind, AnalysisRun, Document, PromptSpec, StreamSink};
use longread_llm::{GenerationBackend, GenerationRequest, ReasoningLevel};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Separator written after each part's output
const PART_SEPARATOR: &str = "\n\n---\n";

/// Header written before the synthesis output
const SYNTHESIS_HEADER: &str = "\n\n## Whole-document synthesis\n\n";

const SAMPLING_NOTICE: &str =
    "*Long document: style is analyzed from samples of the beginning, middle and end.*\n\n";

fn digest_notice(chars: usize) -> String {
    format!("*Analyzing the precomputed digest ({} chars) instead of the full text.*\n\n", chars)
}

fn multi_part_notice(parts: usize) -> String {
    format!(
        "*Long document detected ({} parts). Each part is analyzed in turn.*\n\n",
        parts
    )
}

fn part_header(index: usize, total: usize) -> String {
    format!("\n\n### Part {}/{}\n\n", index + 1, total)
}

fn synthesis_skipped_notice(chars: usize) -> String {
    format!(
        "\n\n*Whole-document synthesis skipped: the combined part analyses ({} chars) are too long.*\n",
        chars
    )
}

/// How a run is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy<'a> {
    /// Analyze the digest text in a single call
    Digest(&'a str),
    /// Analyze a sample of the document in a single call
    Sampled,
    /// Analyze the document chunk by chunk
    Chunked,
}

/// Pick the strategy for `kind`
///
/// The digest wins whenever the kind accepts it and it is complete.
pub fn select_strategy(kind: AnalysisKind, digest: Option<&Digest>) -> Strategy<'_> {
    if kind.accepts_digest() {
        if let Some(text) = digest.and_then(Digest::substitute_text) {
            return Strategy::Digest(text);
        }
    }
    if kind.uses_sampling() {
        Strategy::Sampled
    } else {
        Strategy::Chunked
    }
}

/// Everything an analysis reads
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    /// The loaded document
    pub document: &'a Document,
    /// Instructions for this kind
    pub prompt: &'a PromptSpec,
    /// Precomputed digest, if any
    pub digest: Option<&'a Digest>,
}

impl<'a> AnalysisInput<'a> {
    /// Input without a digest
    pub fn new(document: &'a Document, prompt: &'a PromptSpec) -> Self {
        Self {
            document,
            prompt,
            digest: None,
        }
    }

    /// Attach a digest
    pub fn with_digest(mut self, digest: &'a Digest) -> Self {
        self.digest = Some(digest);
        self
    }
}

/// Appends to the run and reports the running total
struct Transcript<'r, 's> {
    run: &'r mut AnalysisRun,
    sink: &'s mut dyn StreamSink,
}

impl Transcript<'_, '_> {
    fn push(&mut self, delta: &str) {
        let total = self.run.append(delta);
        self.sink.on_update(total);
    }
}

/// Runs analyses against a generation backend
pub struct Analyzer<B: ?Sized> {
    backend: Arc<B>,
    config: EngineConfig,
}

impl<B: GenerationBackend + ?Sized> Analyzer<B> {
    /// Create an analyzer; fails if the config is invalid
    pub fn new(backend: Arc<B>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self { backend, config })
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the analysis for `run.kind()`
    ///
    /// The run is reset first. Its content grows as increments arrive and
    /// `sink` sees the running total after every append. On failure the run
    /// keeps its partial content, is marked failed with the error message, and
    /// the error is returned.
    pub async fn analyze(
        &self,
        run: &mut AnalysisRun,
        input: AnalysisInput<'_>,
        sink: &mut dyn StreamSink,
    ) -> Result<(), EngineError> {
        run.start();
        let kind = run.kind();
        info!("Starting {} analysis of {}", kind, input.document.name());

        let mut transcript = Transcript { run, sink };
        let result = self.execute(kind, &input, &mut transcript).await;

        match &result {
            Ok(()) => {
                transcript.run.complete();
                info!("{} analysis completed", kind);
            }
            Err(e) => {
                warn!("{} analysis failed: {}", kind, e);
                transcript.run.fail(e.to_string());
            }
        }
        result
    }

    async fn execute(
        &self,
        kind: AnalysisKind,
        input: &AnalysisInput<'_>,
        transcript: &mut Transcript<'_, '_>,
    ) -> Result<(), EngineError> {
        if input.document.is_blank() {
            return Err(EngineError::EmptyInput);
        }
        let text = input.document.content();
        let prompt = input.prompt;

        match select_strategy(kind, input.digest) {
            Strategy::Digest(digest_text) => {
                let chars = digest_text.chars().count();
                info!("Using precomputed digest ({} chars)", chars);
                transcript.push(&digest_notice(chars));
                let message = PromptBuilder::new(&prompt.user).build(digest_text);
                self.call(transcript, &prompt.system, message).await
            }
            Strategy::Sampled => {
                let sampler = self.config.sampler();
                if sampler.applies(text) {
                    info!("Sampling {} chars for style analysis", input.document.char_len());
                    transcript.push(SAMPLING_NOTICE);
                }
                let sample = sampler.sample(text);
                let message = PromptBuilder::new(&prompt.user).build(&sample);
                self.call(transcript, &prompt.system, message).await
            }
            Strategy::Chunked => self.run_chunked(kind, text, prompt, transcript).await,
        }
    }

    async fn run_chunked(
        &self,
        kind: AnalysisKind,
        text: &str,
        prompt: &PromptSpec,
        transcript: &mut Transcript<'_, '_>,
    ) -> Result<(), EngineError> {
        let chunks = self.config.splitter().split(text);
        let total = chunks.len();

        if total == 1 {
            let message = PromptBuilder::new(&prompt.user).build(text);
            return self.call(transcript, &prompt.system, message).await;
        }

        info!("Document split into {} parts", total);
        transcript.push(&multi_part_notice(total));

        for (index, chunk) in chunks.iter().enumerate() {
            debug!("Analyzing part {}/{}", index + 1, total);
            transcript.push(&part_header(index, total));
            let message = PromptBuilder::new(&prompt.user)
                .with_progress(index, total)
                .build(chunk);
            self.call(transcript, &prompt.system, message).await?;
            transcript.push(PART_SEPARATOR);
        }

        if kind.synthesizes() {
            self.synthesize(kind, prompt, transcript).await?;
        }
        Ok(())
    }

    async fn synthesize(
        &self,
        kind: AnalysisKind,
        prompt: &PromptSpec,
        transcript: &mut Transcript<'_, '_>,
    ) -> Result<(), EngineError> {
        let accumulated = transcript.run.content().to_string();
        let chars = accumulated.chars().count();

        if chars >= self.config.synthesis_max_input_chars {
            warn!(
                "Skipping synthesis: {} chars of part output exceeds limit of {}",
                chars, self.config.synthesis_max_input_chars
            );
            transcript.push(&synthesis_skipped_notice(chars));
            return Ok(());
        }

        info!("Synthesizing {} chars of part output", chars);
        transcript.push(SYNTHESIS_HEADER);

        let mut builder = PromptBuilder::new(&prompt.user);
        if let Some(directive) = synthesis_directive(kind) {
            builder = builder.with_directive(directive);
        }
        let message = builder.build(&accumulated);
        self.call(transcript, &prompt.system, message).await
    }

    async fn call(
        &self,
        transcript: &mut Transcript<'_, '_>,
        system: &str,
        message: String,
    ) -> Result<(), EngineError> {
        let request = GenerationRequest::new(system, message, ReasoningLevel::High);
        let mut stream = self.backend.stream(request).await?;

        while let Some(piece) = stream.next().await {
            transcript.push(&piece?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_without_digest() {
        assert_eq!(select_strategy(AnalysisKind::Style, None), Strategy::Sampled);
        assert_eq!(select_strategy(AnalysisKind::Outline, None), Strategy::Chunked);
        assert_eq!(select_strategy(AnalysisKind::Summary, None), Strategy::Chunked);
    }

    #[test]
    fn test_strategy_with_complete_digest() {
        let mut digest = Digest::new(1);
        digest.record_completed(0, "condensed");

        assert!(matches!(
            select_strategy(AnalysisKind::Settings, Some(&digest)),
            Strategy::Digest(_)
        ));
        // Style and summary never read the digest
        assert_eq!(select_strategy(AnalysisKind::Style, Some(&digest)), Strategy::Sampled);
        assert_eq!(select_strategy(AnalysisKind::Summary, Some(&digest)), Strategy::Chunked);
    }

    #[test]
    fn test_strategy_with_incomplete_digest() {
        let mut digest = Digest::new(2);
        digest.record_completed(0, "condensed");
        assert_eq!(
            select_strategy(AnalysisKind::PlotHoles, Some(&digest)),
            Strategy::Chunked
        );
    }
}
