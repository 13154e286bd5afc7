//! Digest flow: split, condense each chunk, and fold the summaries
//!
//! The digest is a condensed stand-in for a long document. A `ChunkBook` holds
//! the split chunks and their condensation state; a `Condenser` streams one
//! summary per chunk into it; the `Digest` is the index-ordered fold of the
//! completed summaries, kept up to date as chunks finish.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::prompt::{default_condense_prompt, PromptBuilder};
use futures::StreamExt;
use longread_domain::{Chunk, ChunkObserver, ChunkStatus, Document, PromptSpec};
use longread_llm::{GenerationBackend, GenerationRequest, ReasoningLevel};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rule placed between digest entries
pub const DIGEST_RULE: &str = "\n\n---\n\n";

/// Index-ordered join of completed chunk summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
    chunk_count: usize,
    entries: BTreeMap<usize, String>,
    rendered: String,
}

impl Digest {
    /// Empty digest over `chunk_count` chunks
    pub fn new(chunk_count: usize) -> Self {
        Self {
            chunk_count,
            ..Self::default()
        }
    }

    /// The digest text over the completed subset
    pub fn text(&self) -> &str {
        &self.rendered
    }

    /// Number of chunks the digest covers
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Number of chunks with a completed summary
    pub fn completed_count(&self) -> usize {
        self.entries.len()
    }

    /// True when every chunk has a completed summary
    pub fn is_complete(&self) -> bool {
        self.chunk_count > 0 && self.entries.len() == self.chunk_count
    }

    /// Digest text to substitute for the document, if it is usable
    ///
    /// Only a complete, non-blank digest qualifies.
    pub fn substitute_text(&self) -> Option<&str> {
        (self.is_complete() && !self.rendered.trim().is_empty()).then_some(self.rendered.as_str())
    }

    /// Chunk `index` completed with `summary`
    pub fn record_completed(&mut self, index: usize, summary: &str) {
        let appends = self
            .entries
            .keys()
            .next_back()
            .is_none_or(|&last| last < index);

        let entry = Self::render_entry(index, summary);
        if appends {
            if !self.rendered.is_empty() {
                self.rendered.push_str(DIGEST_RULE);
            }
            self.rendered.push_str(&entry);
            self.entries.insert(index, entry);
        } else {
            self.entries.insert(index, entry);
            self.rebuild();
        }
    }

    /// Chunk `index` left the completed state
    pub fn record_reset(&mut self, index: usize) {
        if self.entries.remove(&index).is_some() {
            self.rebuild();
        }
    }

    fn render_entry(index: usize, summary: &str) -> String {
        format!("[Part {}]\n{}", index + 1, summary.trim())
    }

    fn rebuild(&mut self) {
        self.rendered = self
            .entries
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(DIGEST_RULE);
    }
}

/// Per-status chunk counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Not yet condensed
    pub pending: usize,
    /// Currently streaming
    pub in_progress: usize,
    /// Condensed successfully
    pub completed: usize,
    /// Last attempt failed
    pub failed: usize,
}

/// The split chunks of one document and their condensation state
#[derive(Debug, Clone)]
pub struct ChunkBook {
    chunks: Vec<Chunk>,
    digest: Digest,
}

impl ChunkBook {
    /// Split a document into pending chunks
    ///
    /// Splitting again means building a new book; the old one and its digest
    /// are simply dropped.
    pub fn split(document: &Document, config: &EngineConfig) -> Result<Self, EngineError> {
        if document.is_blank() {
            return Err(EngineError::EmptyInput);
        }
        config.validate().map_err(EngineError::Config)?;

        let pieces = config.splitter().split(document.content());
        info!(
            "Split {} ({} chars) into {} chunks",
            document.name(),
            document.char_len(),
            pieces.len()
        );
        Ok(Self::from_texts(pieces))
    }

    /// Build a book from already-split texts
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks: Vec<Chunk> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(index, text))
            .collect();
        let digest = Digest::new(chunks.len());
        Self { chunks, digest }
    }

    /// All chunks in order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk by index
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the book holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The digest over completed chunks
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// True when every chunk is completed
    pub fn is_complete(&self) -> bool {
        self.digest.is_complete()
    }

    /// Count chunks per status
    pub fn status_counts(&self) -> StatusCounts {
        self.chunks
            .iter()
            .fold(StatusCounts::default(), |mut counts, chunk| {
                match chunk.status() {
                    ChunkStatus::Pending => counts.pending += 1,
                    ChunkStatus::InProgress => counts.in_progress += 1,
                    ChunkStatus::Completed => counts.completed += 1,
                    ChunkStatus::Failed => counts.failed += 1,
                }
                counts
            })
    }

    fn check_index(&self, index: usize) -> Result<(), EngineError> {
        if index < self.chunks.len() {
            Ok(())
        } else {
            Err(EngineError::ChunkOutOfRange {
                index,
                count: self.chunks.len(),
            })
        }
    }

    fn begin(&mut self, index: usize) {
        if self.chunks[index].status() == ChunkStatus::Completed {
            self.digest.record_reset(index);
        }
        self.chunks[index].begin();
    }

    fn append(&mut self, index: usize, delta: &str) -> &str {
        self.chunks[index].append_summary(delta)
    }

    fn complete(&mut self, index: usize) {
        let chunk = &mut self.chunks[index];
        chunk.complete();
        self.digest.record_completed(index, chunk.summary());
    }

    fn fail(&mut self, index: usize) {
        self.chunks[index].fail();
    }
}

/// Outcome of condensing every pending chunk
#[derive(Debug, Default)]
pub struct CondenseReport {
    /// Chunks condensed in this pass
    pub completed: Vec<usize>,
    /// Chunks whose call failed, with the error
    pub failed: Vec<(usize, EngineError)>,
    /// Chunks already completed before the pass
    pub skipped: Vec<usize>,
}

impl CondenseReport {
    /// True when no chunk failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Streams chunk summaries from a generation backend into a `ChunkBook`
pub struct Condenser<B: ?Sized> {
    backend: Arc<B>,
    prompt: PromptSpec,
}

impl<B: GenerationBackend + ?Sized> Condenser<B> {
    /// Create a condenser with a custom condensation prompt
    pub fn new(backend: Arc<B>, prompt: PromptSpec) -> Self {
        Self { backend, prompt }
    }

    /// Create a condenser with the built-in condensation prompt
    pub fn with_default_prompt(backend: Arc<B>) -> Self {
        Self::new(backend, default_condense_prompt())
    }

    /// Condense one chunk
    ///
    /// Works for pending, failed and completed chunks alike; a completed chunk
    /// leaves the digest until its new summary completes.
    pub async fn condense_chunk(
        &self,
        book: &mut ChunkBook,
        index: usize,
        observer: &mut dyn ChunkObserver,
    ) -> Result<(), EngineError> {
        book.check_index(index)?;

        let total = book.len();
        let message = PromptBuilder::new(&self.prompt.user)
            .with_progress(index, total)
            .build(book.chunks[index].text());

        book.begin(index);
        observer.on_status(index, ChunkStatus::InProgress);
        debug!("Condensing chunk {}/{}", index + 1, total);

        match self.stream_summary(book, index, message, observer).await {
            Ok(()) => {
                book.complete(index);
                observer.on_status(index, ChunkStatus::Completed);
                info!("Chunk {}/{} condensed", index + 1, total);
                Ok(())
            }
            Err(e) => {
                book.fail(index);
                observer.on_status(index, ChunkStatus::Failed);
                warn!("Chunk {}/{} failed: {}", index + 1, total, e);
                Err(e)
            }
        }
    }

    /// Condense every chunk that is not yet completed, one at a time
    ///
    /// A failing chunk does not stop the pass.
    pub async fn condense_pending(
        &self,
        book: &mut ChunkBook,
        observer: &mut dyn ChunkObserver,
    ) -> CondenseReport {
        let mut report = CondenseReport::default();

        for index in 0..book.len() {
            if !book.chunks[index].status().needs_condensing() {
                report.skipped.push(index);
                continue;
            }
            match self.condense_chunk(book, index, observer).await {
                Ok(()) => report.completed.push(index),
                Err(e) => report.failed.push((index, e)),
            }
        }

        info!(
            "Condense pass finished: {} completed, {} failed, {} skipped",
            report.completed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    async fn stream_summary(
        &self,
        book: &mut ChunkBook,
        index: usize,
        message: String,
        observer: &mut dyn ChunkObserver,
    ) -> Result<(), EngineError> {
        let request = GenerationRequest::new(&self.prompt.system, message, ReasoningLevel::Low);
        let mut stream = self.backend.stream(request).await?;

        while let Some(piece) = stream.next().await {
            let total = book.append(index, &piece?);
            observer.on_summary(index, total);
        }
        Ok(())
    }
}
