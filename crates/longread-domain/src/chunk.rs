//! Chunk module - one model-sized slice of a document

use std::fmt;

/// Lifecycle of a chunk's condensation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkStatus {
    /// Created by the split step, not yet condensed
    Pending,

    /// A condensation call is streaming into the summary
    InProgress,

    /// Summary populated by a successful call
    Completed,

    /// The last condensation call failed; the summary holds its partial output
    Failed,
}

impl ChunkStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Pending => "pending",
            ChunkStatus::InProgress => "in-progress",
            ChunkStatus::Completed => "completed",
            ChunkStatus::Failed => "failed",
        }
    }

    /// Whether a "condense all" batch should pick this chunk up
    pub fn needs_condensing(&self) -> bool {
        matches!(self, ChunkStatus::Pending | ChunkStatus::Failed)
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slice of the original text plus its derived condensation
///
/// Chunks are independent of each other; aggregation is ordered by `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    text: String,
    summary: String,
    status: ChunkStatus,
}

impl Chunk {
    /// Create a pending chunk with an empty summary
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            summary: String::new(),
            status: ChunkStatus::Pending,
        }
    }

    /// Zero-based sequence index
    pub fn index(&self) -> usize {
        self.index
    }

    /// The original text slice
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The condensation streamed so far
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Current lifecycle status
    pub fn status(&self) -> ChunkStatus {
        self.status
    }

    /// Length of the original slice in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Start a condensation call: clears the summary and marks the chunk in progress
    pub fn begin(&mut self) {
        self.summary.clear();
        self.status = ChunkStatus::InProgress;
    }

    /// Append a streamed increment and return the summary so far
    pub fn append_summary(&mut self, delta: &str) -> &str {
        self.summary.push_str(delta);
        &self.summary
    }

    /// Mark the condensation as successful
    pub fn complete(&mut self) {
        self.status = ChunkStatus::Completed;
    }

    /// Mark the condensation as failed, keeping the partial summary
    pub fn fail(&mut self) {
        self.status = ChunkStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chunk_is_pending() {
        let chunk = Chunk::new(3, "text");
        assert_eq!(chunk.index(), 3);
        assert_eq!(chunk.status(), ChunkStatus::Pending);
        assert!(chunk.summary().is_empty());
    }

    #[test]
    fn test_lifecycle_success() {
        let mut chunk = Chunk::new(0, "text");
        chunk.begin();
        assert_eq!(chunk.status(), ChunkStatus::InProgress);
        assert_eq!(chunk.append_summary("Al"), "Al");
        assert_eq!(chunk.append_summary("ice"), "Alice");
        chunk.complete();
        assert_eq!(chunk.status(), ChunkStatus::Completed);
        assert_eq!(chunk.summary(), "Alice");
    }

    #[test]
    fn test_failure_keeps_partial_and_retry_clears_it() {
        let mut chunk = Chunk::new(0, "text");
        chunk.begin();
        chunk.append_summary("partial");
        chunk.fail();
        assert_eq!(chunk.status(), ChunkStatus::Failed);
        assert_eq!(chunk.summary(), "partial");
        assert!(chunk.status().needs_condensing());

        chunk.begin();
        assert!(chunk.summary().is_empty());
    }

    #[test]
    fn test_needs_condensing() {
        assert!(ChunkStatus::Pending.needs_condensing());
        assert!(ChunkStatus::Failed.needs_condensing());
        assert!(!ChunkStatus::InProgress.needs_condensing());
        assert!(!ChunkStatus::Completed.needs_condensing());
    }
}
